//! Exact common-neighbor counting for non-adjacent pairs.
//!
//! # Overview
//!
//! A graph is *c-closed* when every non-adjacent pair shares at most `c`
//! common neighbors. This module computes the per-pair counts and reduces
//! them to the graph's closure value.
//!
//! ## Pipeline
//!
//! ```text
//! Graph
//!   ↓  enumerate::enumerate() / enumerate_parallel()
//! Enumeration { table: ClosureTable, wedges, closed wedges }
//!   ↓  evaluate::closure_value()
//! minimum c for which the graph is c-closed
//! ```
//!
//! The table is always rebuilt from scratch; callers that mutate the graph
//! (the densifier) re-enumerate instead of patching entries.
//!
//! ## Typical Usage
//!
//! ```rust
//! use cclosure_core::graph::Graph;
//! use cclosure_engine::closure::{closure_value, enumerate};
//!
//! let graph = Graph::from_edges([(1, 2), (1, 3), (2, 3), (1, 4)]).unwrap();
//! let enumeration = enumerate(&graph).unwrap();
//! assert_eq!(closure_value(&enumeration.table), 1);
//! assert_eq!(enumeration.triangles(), 1);
//! ```

pub mod enumerate;
pub mod evaluate;
pub mod table;

pub use enumerate::{EnumerateError, Enumeration, enumerate, enumerate_parallel, enumerate_with};
pub use evaluate::{closure_value, is_c_closed, violations};
pub use table::{ClosureHistogram, ClosureTable};
