//! Reduce a closure table to the graph's closure value.

use cclosure_core::graph::Pair;

use crate::closure::table::ClosureTable;

/// Minimum `c` for which the graph behind `table` is c-closed.
///
/// This is the largest common-neighbor count over all non-adjacent pairs,
/// or 0 when no such pair shares a neighbor.
#[must_use]
pub fn closure_value(table: &ClosureTable) -> u32 {
    table.max_count()
}

/// Return `true` if no non-adjacent pair has more than `c` common neighbors.
#[must_use]
pub fn is_c_closed(table: &ClosureTable, c: u32) -> bool {
    table.iter().all(|(_, count)| count <= c)
}

/// Pairs whose count strictly exceeds `c`, in ascending pair order.
#[must_use]
pub fn violations(table: &ClosureTable, c: u32) -> Vec<(Pair, u32)> {
    table.iter().filter(|&(_, count)| count > c).collect()
}
