//! Dense common-neighbor matrix over compacted node indices.
//!
//! Node ids are mapped to their rank in ascending order, so the matrix is
//! sized by the number of nodes present rather than the largest id. The
//! matrix is symmetric with an implicit excluded diagonal; only the strict
//! upper triangle is stored, row-major.

use cclosure_core::graph::{Graph, Node};
use tracing::debug;

use super::EstimateError;

/// One matrix cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Adjacent pair, or a row/column of a peeled node. Never counted.
    Excluded,
    /// Current common-neighbor count of a non-adjacent pair.
    Count(u32),
}

#[derive(Debug, Clone)]
pub struct CommonNeighborMatrix {
    /// Node id of each compacted index, ascending.
    ids: Vec<Node>,
    /// Neighbors of each index, as compacted indices.
    neighbors: Vec<Vec<usize>>,
    cells: Vec<Cell>,
}

impl CommonNeighborMatrix {
    /// Build the matrix for `graph`.
    ///
    /// # Errors
    ///
    /// - [`EstimateError::MatrixTooLarge`] when `graph` has more than
    ///   `max_nodes` nodes.
    /// - [`EstimateError::DegreeOverflow`] when a count could exceed `u32`.
    pub fn build(graph: &Graph, max_nodes: usize) -> Result<Self, EstimateError> {
        let n = graph.node_count();
        if n > max_nodes {
            return Err(EstimateError::MatrixTooLarge {
                nodes: n,
                limit: max_nodes,
            });
        }
        // A pair's count is bounded by the smaller endpoint degree.
        let max_degree = graph.max_degree();
        if u32::try_from(max_degree).is_err() {
            return Err(EstimateError::DegreeOverflow { degree: max_degree });
        }
        let len = n
            .checked_mul(n.saturating_sub(1))
            .map(|cells| cells / 2)
            .ok_or(EstimateError::MatrixTooLarge {
                nodes: n,
                limit: max_nodes,
            })?;

        let ids: Vec<Node> = graph.nodes().collect();
        let neighbors: Vec<Vec<usize>> = graph
            .adjacency()
            .map(|(_, set)| set.iter().filter_map(|v| ids.binary_search(v).ok()).collect())
            .collect();

        let mut matrix = Self {
            ids,
            neighbors,
            cells: vec![Cell::Count(0); len],
        };

        for w in 0..n {
            let around = &matrix.neighbors[w];
            for (pos, &a) in around.iter().enumerate() {
                for &b in &around[pos + 1..] {
                    let idx = matrix.offset(a, b);
                    let (u, v) = (matrix.ids[a], matrix.ids[b]);
                    if let Cell::Count(count) = &mut matrix.cells[idx] {
                        *count = count
                            .checked_add(1)
                            .ok_or(EstimateError::CountOverflow { u, v })?;
                    }
                }
            }
        }

        for a in 0..n {
            for &b in &matrix.neighbors[a] {
                if a < b {
                    let idx = matrix.offset(a, b);
                    matrix.cells[idx] = Cell::Excluded;
                }
            }
        }

        debug!(nodes = n, cells = len, "common-neighbor matrix built");
        Ok(matrix)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Node id of compacted index `i`.
    #[must_use]
    pub fn node(&self, i: usize) -> Node {
        self.ids[i]
    }

    /// Cell `(i, j)`. The diagonal is always [`Cell::Excluded`].
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Cell {
        if i == j {
            Cell::Excluded
        } else {
            self.cells[self.offset(i, j)]
        }
    }

    /// Largest count in row `i`, or 0 when the row has no counted cell.
    #[must_use]
    pub fn row_max(&self, i: usize) -> u32 {
        let n = self.len();
        let before = (0..i).map(|j| self.cells[self.offset(j, i)]);
        let after: &[Cell] = if i + 1 < n {
            let start = self.offset(i, i + 1);
            &self.cells[start..start + (n - i - 1)]
        } else {
            &[]
        };

        before
            .chain(after.iter().copied())
            .filter_map(|cell| match cell {
                Cell::Count(count) => Some(count),
                Cell::Excluded => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Peel index `i`: exclude its row and column, then take it out of the
    /// counts of every pair of its neighbors that is still counted.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::CountUnderflow`] if a count would drop below
    /// zero.
    pub fn remove(&mut self, i: usize) -> Result<(), EstimateError> {
        let n = self.len();
        for j in 0..n {
            if j != i {
                let idx = self.offset(i, j);
                self.cells[idx] = Cell::Excluded;
            }
        }

        let around = std::mem::take(&mut self.neighbors[i]);
        for (pos, &a) in around.iter().enumerate() {
            for &b in &around[pos + 1..] {
                let idx = self.offset(a, b);
                let (u, v) = (self.ids[a], self.ids[b]);
                if let Cell::Count(count) = &mut self.cells[idx] {
                    *count = count
                        .checked_sub(1)
                        .ok_or(EstimateError::CountUnderflow { u, v })?;
                }
            }
        }
        self.neighbors[i] = around;
        Ok(())
    }

    /// Position of `(i, j)`, `i != j`, in the packed upper triangle.
    fn offset(&self, i: usize, j: usize) -> usize {
        let (r, c) = if i < j { (i, j) } else { (j, i) };
        let n = self.len();
        r * (2 * n - r - 1) / 2 + (c - r - 1)
    }
}
