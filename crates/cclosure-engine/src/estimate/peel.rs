//! Peeling loop over a [`CommonNeighborMatrix`].

use cclosure_core::graph::Node;
use fixedbitset::FixedBitSet;
use rayon::prelude::*;
use serde::Serialize;
use tracing::trace;

use super::EstimateError;
use super::matrix::CommonNeighborMatrix;

/// One peeling round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeelRound {
    /// Minimum row maximum over the nodes remaining at the start of the round.
    pub minimum: u32,
    /// Nodes removed this round, ascending.
    pub removed: Vec<Node>,
}

/// Running state of one peel. Dropped when the estimate is produced.
struct Peeler<'m> {
    matrix: &'m mut CommonNeighborMatrix,
    remaining: FixedBitSet,
    best: u32,
}

impl<'m> Peeler<'m> {
    fn new(matrix: &'m mut CommonNeighborMatrix) -> Self {
        let mut remaining = FixedBitSet::with_capacity(matrix.len());
        remaining.insert_range(..);
        Self {
            matrix,
            remaining,
            best: 0,
        }
    }

    fn row_maxima(&self, parallel: bool) -> Vec<(usize, u32)> {
        let live: Vec<usize> = self.remaining.ones().collect();
        let matrix = &*self.matrix;
        if parallel {
            live.par_iter().map(|&i| (i, matrix.row_max(i))).collect()
        } else {
            live.iter().map(|&i| (i, matrix.row_max(i))).collect()
        }
    }

    /// Run one round. Returns `None` once every node is gone.
    fn step(&mut self, parallel: bool) -> Option<Result<PeelRound, EstimateError>> {
        let maxima = self.row_maxima(parallel);
        let minimum = maxima.iter().map(|&(_, max)| max).min()?;
        self.best = self.best.max(minimum);

        let mut removed = Vec::new();
        for (i, max) in maxima {
            if max != minimum {
                continue;
            }
            self.remaining.set(i, false);
            if let Err(err) = self.matrix.remove(i) {
                return Some(Err(err));
            }
            removed.push(self.matrix.node(i));
        }
        Some(Ok(PeelRound { minimum, removed }))
    }
}

/// Peel every node out of `matrix`.
///
/// Returns the largest per-round minimum together with the round trace.
pub(super) fn peel(
    matrix: &mut CommonNeighborMatrix,
    parallel: bool,
) -> Result<(u32, Vec<PeelRound>), EstimateError> {
    let mut peeler = Peeler::new(matrix);
    let mut rounds = Vec::new();
    while let Some(round) = peeler.step(parallel) {
        let round = round?;
        trace!(
            minimum = round.minimum,
            removed = round.removed.len(),
            best = peeler.best,
            "peel round"
        );
        rounds.push(round);
    }
    Ok((peeler.best, rounds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cclosure_core::graph::Graph;

    fn peel_edges(edges: &[(Node, Node)], parallel: bool) -> (u32, Vec<PeelRound>) {
        let graph = Graph::from_edges(edges.iter().copied()).expect("valid edges");
        let mut matrix = CommonNeighborMatrix::build(&graph, 1_000).expect("build");
        peel(&mut matrix, parallel).expect("peel")
    }

    #[test]
    fn pendant_triangle_trace() {
        let (best, rounds) = peel_edges(&[(1, 2), (1, 3), (2, 3), (1, 4)], false);
        // Node 1 is adjacent to everything, so its row is empty.
        assert_eq!(rounds[0], PeelRound {
            minimum: 0,
            removed: vec![1],
        });
        // Peeling 1 drops every remaining count to zero.
        assert_eq!(rounds[1], PeelRound {
            minimum: 0,
            removed: vec![2, 3, 4],
        });
        assert_eq!(rounds.len(), 2);
        assert_eq!(best, 0);
    }

    #[test]
    fn every_node_is_removed_once() {
        let edges = [(0, 1), (1, 2), (2, 3), (3, 0), (0, 4), (4, 2), (5, 1)];
        let (_, rounds) = peel_edges(&edges, false);
        let mut removed: Vec<Node> = rounds.iter().flat_map(|r| r.removed.clone()).collect();
        removed.sort_unstable();
        assert_eq!(removed, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn parallel_rows_match_sequential() {
        let edges = [(0, 1), (1, 2), (2, 3), (3, 0), (0, 4), (4, 2), (5, 1), (5, 3)];
        assert_eq!(peel_edges(&edges, true), peel_edges(&edges, false));
    }
}
