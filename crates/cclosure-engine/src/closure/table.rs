//! Closure table: non-adjacent pair → common-neighbor count.

#![allow(clippy::module_name_repetitions)]

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use cclosure_core::graph::Pair;

/// Observed common-neighbor count → number of non-adjacent pairs with it.
pub type ClosureHistogram = BTreeMap<u32, u64>;

/// Common-neighbor counts keyed by canonical non-adjacent [`Pair`].
///
/// Only pairs with at least one common neighbor have an entry; an absent
/// pair shares none. Iteration is in ascending pair order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClosureTable {
    counts: BTreeMap<Pair, u32>,
}

impl ClosureTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one common neighbor to `pair`.
    ///
    /// Returns `None` if the count would overflow `u32`.
    pub fn increment(&mut self, pair: Pair) -> Option<u32> {
        self.add(pair, 1)
    }

    /// Add `amount` common neighbors to `pair`.
    ///
    /// Returns the new count, or `None` on overflow (the entry is unchanged).
    pub fn add(&mut self, pair: Pair, amount: u32) -> Option<u32> {
        match self.counts.entry(pair) {
            Entry::Vacant(slot) => Some(*slot.insert(amount)),
            Entry::Occupied(mut slot) => {
                let next = slot.get().checked_add(amount)?;
                *slot.get_mut() = next;
                Some(next)
            }
        }
    }

    /// Common-neighbor count of `pair` (0 when absent).
    #[must_use]
    pub fn get(&self, pair: Pair) -> u32 {
        self.counts.get(&pair).copied().unwrap_or(0)
    }

    /// Number of pairs with at least one common neighbor.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Return `true` if no non-adjacent pair shares a neighbor.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate `(pair, count)` in ascending pair order.
    pub fn iter(&self) -> impl Iterator<Item = (Pair, u32)> + '_ {
        self.counts.iter().map(|(&pair, &count)| (pair, count))
    }

    /// Largest count in the table, 0 when empty.
    #[must_use]
    pub fn max_count(&self) -> u32 {
        self.counts.values().copied().max().unwrap_or(0)
    }

    /// Frequency of each observed count.
    #[must_use]
    pub fn histogram(&self) -> ClosureHistogram {
        let mut histogram = ClosureHistogram::new();
        for &count in self.counts.values() {
            *histogram.entry(count).or_insert(0) += 1;
        }
        histogram
    }

    /// Fold `other` into `self` by summing counts per pair.
    ///
    /// Returns the first pair whose sum overflows, leaving `self` partially
    /// merged.
    pub(crate) fn merge(&mut self, other: Self) -> Result<(), Pair> {
        for (pair, count) in other.counts {
            self.add(pair, count).ok_or(pair)?;
        }
        Ok(())
    }
}
