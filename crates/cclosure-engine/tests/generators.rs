use cclosure_core::graph::{Graph, Node};
use proptest::prelude::*;

/// Small graphs on up to `max_nodes` ids with arbitrary edge subsets.
pub fn arb_graph(max_nodes: Node) -> impl Strategy<Value = Graph> {
    (2..=max_nodes).prop_flat_map(|n| {
        let pairs: Vec<(Node, Node)> = (0..n)
            .flat_map(|u| ((u + 1)..n).map(move |v| (u, v)))
            .collect();
        let len = pairs.len();
        proptest::collection::vec(any::<bool>(), len).prop_map(move |mask| {
            let mut graph = Graph::new();
            for node in 0..n {
                graph.add_node(node);
            }
            for (&(u, v), keep) in pairs.iter().zip(mask) {
                if keep {
                    graph.add_edge(u, v).expect("distinct endpoints");
                }
            }
            graph
        })
    })
}

/// `|N(u) ∩ N(v)|` by direct set intersection.
pub fn brute_common(graph: &Graph, u: Node, v: Node) -> u32 {
    let shared = graph.neighbors(u).intersection(graph.neighbors(v)).count();
    u32::try_from(shared).expect("small graph")
}
