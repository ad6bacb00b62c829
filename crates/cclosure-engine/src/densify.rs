//! Fixed-point densification toward a target closure bound.
//!
//! # Overview
//!
//! Given a target `c`, every non-adjacent pair with more than `c` common
//! neighbors is joined by an edge. Added edges create new wedges, so the
//! closure table is rebuilt and the process repeats until no pair exceeds
//! `c`.
//!
//! ```text
//! DensifyState { graph, table }
//!   ↓  densify_round()   add every violating pair, re-enumerate
//! DensifyState { graph', table' }   + edges added this round
//!   ↓  ... until table' has no entry > c
//! DensifyOutcome { rounds: [added per round], ... }
//! ```
//!
//! Every round adds at least one edge and the edge set is bounded by the
//! complete graph, so the loop always terminates. It may still take many
//! rounds on large inputs, so [`DensifyConfig::max_rounds`] caps it and
//! [`DensifyError::NotConverged`] carries the partial trace.
//!
//! Target 0 saturates the graph: every wedge gets closed.

#![allow(clippy::module_name_repetitions)]

use std::time::{Duration, Instant};

use cclosure_core::config::CclosureConfig;
use cclosure_core::graph::{Graph, GraphError};
use cclosure_core::timing;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::closure::{
    ClosureTable, EnumerateError, closure_value, enumerate_with, is_c_closed, violations,
};

/// Default cap on densification rounds.
pub const DEFAULT_MAX_ROUNDS: usize = 10_000;

// ---------------------------------------------------------------------------
// Config / errors
// ---------------------------------------------------------------------------

/// Knobs for [`densify`] and [`sweep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DensifyConfig {
    /// Rounds allowed before giving up with [`DensifyError::NotConverged`].
    pub max_rounds: usize,
    /// Re-enumerate with the rayon enumerator.
    pub parallel: bool,
}

impl Default for DensifyConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            parallel: false,
        }
    }
}

impl DensifyConfig {
    /// Build from the `[densify]` and `[enumerate]` config sections.
    #[must_use]
    pub const fn from_config(config: &CclosureConfig) -> Self {
        Self {
            max_rounds: config.densify.max_rounds,
            parallel: config.enumerate.parallel,
        }
    }
}

/// Errors raised while densifying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DensifyError {
    /// The round cap was hit before the graph became `target_c`-closed.
    #[error(
        "densify toward c={target_c} did not converge after {} rounds ({edges_added} edges added)",
        rounds.len()
    )]
    NotConverged {
        target_c: u32,
        /// Edges added in each completed round.
        rounds: Vec<u64>,
        edges_added: u64,
    },

    #[error(transparent)]
    Enumerate(#[from] EnumerateError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Graph under densification together with its current closure table.
///
/// The table always describes `graph` as it is; [`densify_round`] consumes
/// the state and returns the next one.
#[derive(Debug)]
pub struct DensifyState<'g> {
    pub graph: &'g mut Graph,
    pub table: ClosureTable,
}

impl<'g> DensifyState<'g> {
    /// Enumerate `graph` to produce the initial state.
    ///
    /// # Errors
    ///
    /// Propagates [`EnumerateError`] as [`DensifyError::Enumerate`].
    pub fn new(graph: &'g mut Graph, parallel: bool) -> Result<Self, DensifyError> {
        let table = enumerate_with(graph, parallel)?.table;
        Ok(Self { graph, table })
    }

    /// Closure value of the current graph.
    #[must_use]
    pub fn closure(&self) -> u32 {
        closure_value(&self.table)
    }
}

/// Run one round: add an edge for every pair above `target_c`, then rebuild
/// the table from scratch.
///
/// Returns the next state and the number of edges added.
///
/// # Errors
///
/// Returns [`DensifyError`] if re-enumeration overflows.
pub fn densify_round(
    state: DensifyState<'_>,
    target_c: u32,
    parallel: bool,
) -> Result<(DensifyState<'_>, u64), DensifyError> {
    timing::timed("densify.round", || -> Result<_, DensifyError> {
        let DensifyState { graph, table } = state;

        let mut added = 0_u64;
        for (pair, _) in violations(&table, target_c) {
            if graph.add_edge(pair.lo(), pair.hi())? {
                added += 1;
            }
        }
        drop(table);

        let table = enumerate_with(graph, parallel)?.table;
        Ok((DensifyState { graph, table }, added))
    })
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of a converged densification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DensifyOutcome {
    pub target_c: u32,
    /// Edges added in each round, in order. Empty if the input was already
    /// `target_c`-closed.
    pub rounds: Vec<u64>,
    pub initial_edges: usize,
    pub final_edges: usize,
    /// Closure value after the last round; never above `target_c`.
    pub final_closure: u32,
}

impl DensifyOutcome {
    /// Total edges added over all rounds.
    #[must_use]
    pub fn total_added(&self) -> u64 {
        self.rounds.iter().sum()
    }

    /// Number of rounds performed.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.rounds.len()
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Densify `graph` in place until it is `target_c`-closed.
///
/// # Errors
///
/// - [`DensifyError::NotConverged`] when `config.max_rounds` rounds were not
///   enough. The edges from completed rounds remain in `graph`.
/// - [`DensifyError::Enumerate`] on counter overflow.
#[instrument(skip(graph, config), fields(edges = graph.edge_count()))]
pub fn densify(
    graph: &mut Graph,
    target_c: u32,
    config: &DensifyConfig,
) -> Result<DensifyOutcome, DensifyError> {
    let initial_edges = graph.edge_count();
    let mut state = DensifyState::new(graph, config.parallel)?;
    let mut rounds: Vec<u64> = Vec::new();

    while !is_c_closed(&state.table, target_c) {
        if rounds.len() >= config.max_rounds {
            let edges_added = rounds.iter().sum();
            warn!(
                target_c,
                rounds = rounds.len(),
                edges_added,
                "densify hit the round cap"
            );
            return Err(DensifyError::NotConverged {
                target_c,
                rounds,
                edges_added,
            });
        }

        let (next, added) = densify_round(state, target_c, config.parallel)?;
        debug!(
            round = rounds.len() + 1,
            added,
            edges = next.graph.edge_count(),
            "densify round complete"
        );
        rounds.push(added);
        state = next;
    }

    let outcome = DensifyOutcome {
        target_c,
        initial_edges,
        final_edges: state.graph.edge_count(),
        final_closure: state.closure(),
        rounds,
    };
    info!(
        target_c,
        iterations = outcome.iterations(),
        total_added = outcome.total_added(),
        "densify converged"
    );
    Ok(outcome)
}

/// One target of a [`sweep`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepRun {
    pub target_c: u32,
    pub elapsed: Duration,
    pub result: Result<DensifyOutcome, DensifyError>,
}

/// Densify a fresh copy of `graph` for every target from `from` down to
/// `to`, inclusive.
///
/// Runs are independent: a non-converging target is recorded and the sweep
/// moves on. Returns nothing when `from < to`.
#[instrument(skip(graph, config), fields(edges = graph.edge_count()))]
pub fn sweep(graph: &Graph, from: u32, to: u32, config: &DensifyConfig) -> Vec<SweepRun> {
    (to..=from)
        .rev()
        .map(|target_c| {
            let started = Instant::now();
            let mut working = graph.clone();
            let result = densify(&mut working, target_c, config);
            SweepRun {
                target_c,
                elapsed: started.elapsed(),
                result,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
