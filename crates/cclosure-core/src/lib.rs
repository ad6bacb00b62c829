#![forbid(unsafe_code)]
//! cclosure-core library.
//!
//! Foundational pieces shared by the analysis engine and the CLI:
//!
//! - [`graph`]: the adjacency-set store for undirected simple graphs.
//! - [`edgelist`]: loader for the whitespace-separated edge-list format.
//! - [`config`]: TOML configuration with serde defaults.
//! - [`timing`]: opt-in per-stage latency collection.
//! - [`error`]: stable machine-readable error codes.
//!
//! # Conventions
//!
//! - **Errors**: one `thiserror` enum per module; orchestration code uses
//!   `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod edgelist;
pub mod error;
pub mod graph;
pub mod timing;

pub use edgelist::{EdgeListError, LoadStats, load_edge_list, parse_edge_list};
pub use graph::{Graph, GraphError, Node, Pair};
