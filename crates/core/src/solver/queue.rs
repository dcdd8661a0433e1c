//! Min-cost priority queue of boundary entries.

use crate::core_types::BoundaryEntry;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Heap slot ordered so that `BinaryHeap` pops the cheapest entry first.
///
/// Ties break on `(row, col)` so pop order does not depend on push order.
#[derive(Debug, Clone, Copy)]
struct Queued(BoundaryEntry);

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .cost
            .total_cmp(&self.0.cost)
            .then_with(|| other.0.row.cmp(&self.0.row))
            .then_with(|| other.0.col.cmp(&self.0.col))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

/// Pending work of one kernel invocation
#[derive(Debug, Clone, Default)]
pub struct CostQueue {
    heap: BinaryHeap<Queued>,
}

impl CostQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry
    pub fn push(&mut self, entry: BoundaryEntry) {
        self.heap.push(Queued(entry));
    }

    /// Remove the cheapest entry
    pub fn pop(&mut self) -> Option<BoundaryEntry> {
        self.heap.pop().map(|queued| queued.0)
    }

    /// Number of queued entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether nothing is queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl FromIterator<BoundaryEntry> for CostQueue {
    fn from_iter<I: IntoIterator<Item = BoundaryEntry>>(iter: I) -> Self {
        Self {
            heap: iter.into_iter().map(Queued).collect(),
        }
    }
}

impl Extend<BoundaryEntry> for CostQueue {
    fn extend<I: IntoIterator<Item = BoundaryEntry>>(&mut self, iter: I) {
        self.heap.extend(iter.into_iter().map(Queued));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_cheapest_first() {
        let mut queue: CostQueue = [
            BoundaryEntry::new(0, 0, 1.0, 5.0),
            BoundaryEntry::new(1, 0, 1.0, 1.0),
            BoundaryEntry::new(2, 0, 1.0, 3.0),
        ]
        .into_iter()
        .collect();

        let costs: Vec<f64> = std::iter::from_fn(|| queue.pop()).map(|e| e.cost).collect();
        assert_eq!(costs, vec![1.0, 3.0, 5.0]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ties_break_on_position() {
        let mut queue = CostQueue::new();
        queue.extend([
            BoundaryEntry::new(3, 1, 1.0, 2.0),
            BoundaryEntry::new(0, 1, 1.0, 2.0),
            BoundaryEntry::new(2, 0, 1.0, 2.0),
        ]);
        assert_eq!(queue.len(), 3);

        let order: Vec<(i64, i64)> = std::iter::from_fn(|| queue.pop())
            .map(|e| (e.col, e.row))
            .collect();
        assert_eq!(order, vec![(2, 0), (0, 1), (3, 1)]);
    }
}
