#![no_main]

use cclosure_core::edgelist::parse_edge_list;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic the loader: either a graph or a line error.
    if let Ok((graph, stats)) = parse_edge_list(data) {
        assert_eq!(graph.edge_count(), stats.edges);
        assert!(stats.lines >= stats.edges + stats.duplicate_edges + stats.self_loops);
    }
});
