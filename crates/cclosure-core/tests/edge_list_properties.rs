//! Property tests for the graph store and the edge-list loader.
//!
//! Any edge list, written in any order and with either orientation per
//! line, must load into the same symmetric simple graph.

use std::collections::BTreeSet;

use cclosure_core::edgelist::parse_edge_list;
use cclosure_core::graph::{Graph, Pair};
use proptest::prelude::*;

fn arb_edges() -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec((0u32..24, 0u32..24), 0..80)
}

fn render(edges: &[(u32, u32)]) -> String {
    let mut text = String::from("# generated\n");
    for (u, v) in edges {
        text.push_str(&format!("{u}\t{v}\n"));
    }
    text
}

fn unique_pairs(edges: &[(u32, u32)]) -> BTreeSet<Pair> {
    edges.iter().filter_map(|&(u, v)| Pair::new(u, v)).collect()
}

proptest! {
    #[test]
    fn loader_collapses_duplicates_and_loops(edges in arb_edges()) {
        let (graph, stats) = parse_edge_list(render(&edges).as_bytes()).expect("valid list");
        let pairs = unique_pairs(&edges);
        let loops = edges.iter().filter(|(u, v)| u == v).count();

        prop_assert_eq!(graph.edge_count(), pairs.len());
        prop_assert_eq!(stats.edges, pairs.len());
        prop_assert_eq!(stats.self_loops, loops);
        prop_assert_eq!(stats.duplicate_edges, edges.len() - loops - pairs.len());
        prop_assert_eq!(stats.comments, 1);
        prop_assert_eq!(graph.edges().collect::<BTreeSet<_>>(), pairs);
    }

    #[test]
    fn adjacency_is_symmetric_without_loops(edges in arb_edges()) {
        let (graph, _) = parse_edge_list(render(&edges).as_bytes()).expect("valid list");
        for (node, neighbors) in graph.adjacency() {
            prop_assert!(!neighbors.contains(&node));
            for &other in neighbors {
                prop_assert!(graph.has_edge(other, node));
            }
        }
        let degree_sum: usize = graph.nodes().map(|n| graph.degree(n)).sum();
        prop_assert_eq!(degree_sum, 2 * graph.edge_count());
    }

    #[test]
    fn fingerprint_ignores_order_and_orientation(edges in arb_edges()) {
        let forward = Graph::from_edges(edges.iter().copied().filter(|(u, v)| u != v))
            .expect("no loops");
        let reversed = Graph::from_edges(
            edges.iter().rev().map(|&(u, v)| (v, u)).filter(|(u, v)| u != v),
        )
        .expect("no loops");

        prop_assert_eq!(forward.content_hash(), reversed.content_hash());
        prop_assert_eq!(forward, reversed);
    }
}

#[test]
fn snap_style_header_loads() {
    let text = "# Directed graph (each unordered pair of nodes is saved once): CA-GrQc.txt\n\
                # Nodes: 4 Edges: 3\n\
                # FromNodeId\tToNodeId\n\
                3466\t937\n\
                3466\t5233\n\
                937\t5233\n";
    let (graph, stats) = parse_edge_list(text.as_bytes()).expect("valid list");
    assert_eq!(stats.comments, 3);
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.max_node_id(), Some(5233));
}
