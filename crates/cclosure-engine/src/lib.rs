#![forbid(unsafe_code)]
//! cclosure-engine library.
//!
//! # Overview
//!
//! Characterizes the c-closure of an undirected graph: for every
//! non-adjacent pair, the number of common neighbors the pair shares.
//!
//! ```text
//! Graph (cclosure_core::graph)
//!   ├─ closure::enumerate ──► ClosureTable + triangles/wedges
//!   │      ├─ closure::evaluate ──► exact closure value
//!   │      ├─ stats ──► GraphSummary, histogram
//!   │      └─ densify ──► edges added per round
//!   └─ estimate ──► peeling estimate over a dense matrix
//! ```
//!
//! [`pipeline::analyze`] composes every stage for one graph.
//!
//! # Conventions
//!
//! - **Errors**: one `thiserror` enum per algorithm; `anyhow::Result` in the
//!   pipeline.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod closure;
pub mod densify;
pub mod estimate;
pub mod pipeline;
pub mod stats;

pub use closure::{
    ClosureTable, EnumerateError, Enumeration, closure_value, enumerate, enumerate_parallel,
    is_c_closed,
};
pub use densify::{DensifyConfig, DensifyError, DensifyOutcome, SweepRun, densify, sweep};
pub use estimate::{Estimate, EstimateConfig, EstimateError, estimate};
pub use pipeline::{AnalysisOptions, AnalysisReport, DensifyReport, EstimateReport, analyze};
pub use stats::GraphSummary;
