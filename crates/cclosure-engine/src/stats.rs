//! Summary statistics for an analyzed graph.
//!
//! # Statistics Provided
//!
//! - **node_count** / **edge_count**: size of the graph store.
//! - **density**: `edge_count / (n · (n − 1) / 2)`. Zero for graphs with
//!   fewer than two nodes.
//! - **component_count**: connected components, isolated nodes included.
//! - **isolated_node_count**: nodes with no neighbors.
//! - **max_degree**: largest neighbor set.
//! - **triangles** / **wedges**: from the enumeration sweep.
//! - **transitivity**: `3 · triangles / wedges`; `None` when the graph has no
//!   wedges.
//! - **closure_value**: exact minimum c for which the graph is c-closed.
//! - **fingerprint**: BLAKE3 hash of the canonical edge list.

use cclosure_core::graph::{Graph, Node};
use petgraph::algo::connected_components;
use petgraph::graph::UnGraph;
use serde::Serialize;

use crate::closure::{Enumeration, closure_value};

// ---------------------------------------------------------------------------
// GraphSummary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub component_count: usize,
    pub isolated_node_count: usize,
    pub max_degree: usize,
    pub triangles: u64,
    pub wedges: u64,
    pub transitivity: Option<f64>,
    pub closure_value: u32,
    pub fingerprint: String,
}

impl GraphSummary {
    /// Compute the summary of `graph` from its enumeration.
    ///
    /// `enumeration` must come from the same graph.
    #[must_use]
    pub fn compute(graph: &Graph, enumeration: &Enumeration) -> Self {
        let node_count = graph.node_count();
        let edge_count = graph.edge_count();

        let isolated_node_count = graph
            .adjacency()
            .filter(|(_, neighbors)| neighbors.is_empty())
            .count();

        Self {
            node_count,
            edge_count,
            density: compute_density(node_count, edge_count),
            component_count: component_count(graph),
            isolated_node_count,
            max_degree: graph.max_degree(),
            triangles: enumeration.triangles(),
            wedges: enumeration.wedges,
            transitivity: enumeration.transitivity(),
            closure_value: closure_value(&enumeration.table),
            fingerprint: graph.content_hash(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[allow(clippy::cast_precision_loss)]
fn compute_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0;
    }
    let possible = node_count as f64 * (node_count as f64 - 1.0) / 2.0;
    edge_count as f64 / possible
}

/// Connected components via petgraph over a compacted copy of the store.
fn component_count(graph: &Graph) -> usize {
    let ids: Vec<Node> = graph.nodes().collect();
    let mut ug: UnGraph<Node, ()> = UnGraph::with_capacity(ids.len(), graph.edge_count());
    let indices: Vec<_> = ids.iter().map(|&id| ug.add_node(id)).collect();

    for pair in graph.edges() {
        if let (Ok(a), Ok(b)) = (ids.binary_search(&pair.lo()), ids.binary_search(&pair.hi())) {
            ug.add_edge(indices[a], indices[b], ());
        }
    }

    connected_components(&ug)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
