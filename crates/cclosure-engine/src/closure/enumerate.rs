//! Wedge enumeration.
//!
//! # Algorithm
//!
//! For every node `w` and every unordered pair `(a, b)` of its neighbors:
//!
//! 1. count a wedge `a – w – b`;
//! 2. if `a` and `b` are adjacent the wedge is closed (part of a triangle);
//! 3. otherwise `w` is a common neighbor of the non-adjacent pair, so the
//!    pair's table entry is incremented.
//!
//! A pair is reached once per common neighbor, so after the sweep each entry
//! holds the exact size of `N(a) ∩ N(b)`. Each triangle is seen once from
//! each of its three corners, so the triangle count is `closed / 3`.
//!
//! Complexity: O(Σ deg(v)²). High-degree hubs dominate the cost.
//!
//! # Parallelism
//!
//! [`enumerate_parallel`] splits nodes across rayon workers. Each worker
//! fills a private [`Enumeration`]; partials are merged by summation, so the
//! result is identical to the sequential sweep.

#![allow(clippy::module_name_repetitions)]

use std::collections::BTreeSet;
use std::ops::Bound;

use cclosure_core::graph::{Graph, Node, Pair};
use cclosure_core::timing;
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::closure::table::ClosureTable;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while counting common neighbors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnumerateError {
    /// A pair's common-neighbor count exceeded the counter width.
    #[error("common-neighbor count for pair {0} overflowed")]
    PairOverflow(Pair),

    /// The wedge counter exceeded `u64`.
    #[error("wedge counter overflowed")]
    WedgeOverflow,
}

// ---------------------------------------------------------------------------
// Enumeration
// ---------------------------------------------------------------------------

/// Output of one full wedge sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enumeration {
    /// Common-neighbor counts for non-adjacent pairs.
    pub table: ClosureTable,
    /// Number of wedges (unordered neighbor pairs, summed over all nodes).
    pub wedges: u64,
    /// Wedges whose endpoints are adjacent. Each triangle contributes three.
    pub closed_wedges: u64,
}

impl Enumeration {
    /// Number of triangles in the graph.
    #[must_use]
    pub const fn triangles(&self) -> u64 {
        self.closed_wedges / 3
    }

    /// Fraction of wedges that close into triangles.
    ///
    /// Equals `3 · triangles / wedges`. Returns `None` when the graph has no
    /// wedges, where the ratio is undefined.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn transitivity(&self) -> Option<f64> {
        if self.wedges == 0 {
            return None;
        }
        Some(self.closed_wedges as f64 / self.wedges as f64)
    }

    /// Count the wedges centred on one node.
    fn visit(&mut self, graph: &Graph, neighbors: &BTreeSet<Node>) -> Result<(), EnumerateError> {
        for &a in neighbors {
            for &b in neighbors.range((Bound::Excluded(a), Bound::Unbounded)) {
                self.wedges = self
                    .wedges
                    .checked_add(1)
                    .ok_or(EnumerateError::WedgeOverflow)?;

                if graph.has_edge(a, b) {
                    self.closed_wedges += 1;
                } else if let Some(pair) = Pair::new(a, b) {
                    self.table
                        .increment(pair)
                        .ok_or(EnumerateError::PairOverflow(pair))?;
                }
            }
        }
        Ok(())
    }

    fn merge(mut self, other: Self) -> Result<Self, EnumerateError> {
        self.wedges = self
            .wedges
            .checked_add(other.wedges)
            .ok_or(EnumerateError::WedgeOverflow)?;
        self.closed_wedges += other.closed_wedges;
        self.table
            .merge(other.table)
            .map_err(EnumerateError::PairOverflow)?;
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Enumerate every wedge of `graph` on the current thread.
///
/// # Errors
///
/// Returns [`EnumerateError`] if a counter overflows.
#[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn enumerate(graph: &Graph) -> Result<Enumeration, EnumerateError> {
    timing::timed("closure.enumerate", || -> Result<Enumeration, EnumerateError> {
        let mut acc = Enumeration::default();
        for (_, neighbors) in graph.adjacency() {
            acc.visit(graph, neighbors)?;
        }
        debug!(
            pairs = acc.table.len(),
            wedges = acc.wedges,
            closed = acc.closed_wedges,
            "enumeration complete"
        );
        Ok(acc)
    })
}

/// Enumerate every wedge of `graph` across the rayon thread pool.
///
/// The result is equal to [`enumerate`] for the same graph.
///
/// # Errors
///
/// Returns [`EnumerateError`] if a counter overflows.
#[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn enumerate_parallel(graph: &Graph) -> Result<Enumeration, EnumerateError> {
    timing::timed("closure.enumerate", || -> Result<Enumeration, EnumerateError> {
        let neighborhoods: Vec<&BTreeSet<Node>> = graph.adjacency().map(|(_, set)| set).collect();

        let acc = neighborhoods
            .par_iter()
            .try_fold(Enumeration::default, |mut acc, neighbors| {
                acc.visit(graph, neighbors)?;
                Ok::<_, EnumerateError>(acc)
            })
            .try_reduce(Enumeration::default, Enumeration::merge)?;

        debug!(
            pairs = acc.table.len(),
            wedges = acc.wedges,
            closed = acc.closed_wedges,
            "parallel enumeration complete"
        );
        Ok(acc)
    })
}

/// Dispatch to [`enumerate_parallel`] or [`enumerate`].
///
/// # Errors
///
/// Returns [`EnumerateError`] if a counter overflows.
pub fn enumerate_with(graph: &Graph, parallel: bool) -> Result<Enumeration, EnumerateError> {
    if parallel {
        enumerate_parallel(graph)
    } else {
        enumerate(graph)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
