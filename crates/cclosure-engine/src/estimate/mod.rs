//! Approximate closure value by peeling a common-neighbor matrix.
//!
//! # Overview
//!
//! The estimator trades the sparse table of [`crate::closure`] for a dense
//! matrix of common-neighbor counts, then repeatedly removes the nodes whose
//! largest count is smallest:
//!
//! ```text
//! Graph
//!   ↓  matrix::CommonNeighborMatrix::build()   counts + Excluded cells
//!   ↓  peel::peel()
//!        row maxima over remaining nodes
//!        m = min(row maxima); best = max(best, m)
//!        remove every node with row max == m (ascending id)
//!   ↓
//! Estimate { value: best, rounds }
//! ```
//!
//! Removing a node excludes its row and column and subtracts it from the
//! count of every pair of its neighbors. Counts only ever decrease, so no
//! round minimum can exceed the exact closure value; the estimate is a
//! heuristic lower bound and is never reported as exact.
//!
//! Memory is quadratic in the node count. [`EstimateConfig::max_nodes`]
//! refuses graphs that would not fit.

#![allow(clippy::module_name_repetitions)]

pub mod matrix;
pub mod peel;

use cclosure_core::config::CclosureConfig;
use cclosure_core::graph::{Graph, Node};
use cclosure_core::timing;
use serde::Serialize;
use tracing::{info, instrument};

pub use matrix::{Cell, CommonNeighborMatrix};
pub use peel::PeelRound;

/// Default node limit for the dense matrix.
pub const DEFAULT_MAX_NODES: usize = 10_000;

/// Knobs for [`estimate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimateConfig {
    /// Largest node count for which the matrix is allocated.
    pub max_nodes: usize,
    /// Compute row maxima on the rayon pool.
    pub parallel: bool,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            parallel: true,
        }
    }
}

impl EstimateConfig {
    #[must_use]
    pub const fn from_config(config: &CclosureConfig) -> Self {
        Self {
            max_nodes: config.estimate.max_nodes,
            parallel: config.estimate.parallel,
        }
    }
}

/// Errors raised by the estimator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EstimateError {
    /// A node degree exceeds what a matrix cell can count.
    #[error("degree {degree} does not fit a matrix cell")]
    DegreeOverflow { degree: usize },

    /// The graph has more nodes than the configured limit.
    #[error("graph has {nodes} nodes, matrix limit is {limit}")]
    MatrixTooLarge { nodes: usize, limit: usize },

    #[error("common-neighbor count of ({u}, {v}) overflowed")]
    CountOverflow { u: Node, v: Node },

    #[error("common-neighbor count of ({u}, {v}) dropped below zero")]
    CountUnderflow { u: Node, v: Node },
}

/// Result of one estimation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Estimate {
    /// Largest per-round minimum seen while peeling.
    pub value: u32,
    /// Number of nodes peeled.
    pub nodes: usize,
    pub rounds: Vec<PeelRound>,
}

/// Estimate the closure value of `graph`.
///
/// An empty graph estimates to 0 with no rounds.
///
/// # Errors
///
/// Returns [`EstimateError`] when the matrix cannot be built or a count
/// leaves its range.
#[instrument(skip_all, fields(nodes = graph.node_count(), max_nodes = config.max_nodes))]
pub fn estimate(graph: &Graph, config: &EstimateConfig) -> Result<Estimate, EstimateError> {
    let mut matrix = timing::timed("estimate.build_matrix", || {
        CommonNeighborMatrix::build(graph, config.max_nodes)
    })?;
    let (value, rounds) = timing::timed("estimate.peel", || {
        peel::peel(&mut matrix, config.parallel)
    })?;

    info!(value, rounds = rounds.len(), "estimate complete");
    Ok(Estimate {
        value,
        nodes: matrix.len(),
        rounds,
    })
}
