#![no_main]

use cclosure_core::graph::Graph;
use cclosure_engine::densify::{DensifyConfig, densify};
use cclosure_engine::estimate::{EstimateConfig, estimate};
use cclosure_engine::{closure_value, enumerate, is_c_closed};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut graph = Graph::new();
    for chunk in data.chunks_exact(2).take(256) {
        let (u, v) = (u32::from(chunk[0] % 32), u32::from(chunk[1] % 32));
        if u != v {
            let _ = graph.add_edge(u, v);
        }
    }

    let Ok(exact) = enumerate(&graph) else { return };
    let value = closure_value(&exact.table);

    if let Ok(found) = estimate(&graph, &EstimateConfig::default()) {
        assert!(found.value <= value);
    }

    let target = value / 2;
    if densify(&mut graph, target, &DensifyConfig::default()).is_ok() {
        let after = enumerate(&graph).expect("densified graph enumerates");
        assert!(is_c_closed(&after.table, target));
    }
});
