//! Round aggregator
//!
//! Collects the [`PendingUpdate`]s emitted by every kernel invocation of a
//! round. `add` takes `&self` and locks internally, so many workers may feed
//! one aggregator; `merge` is an associative, commutative union, so
//! partition-local aggregators built by a parallel `fold` combine into the
//! same global view in any order.

use crate::core_types::{BoundaryEntry, PendingUpdate, TileKey};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Boundary entries grouped by destination tile
pub type UpdateMap = FxHashMap<TileKey, Vec<BoundaryEntry>>;

/// Concurrency-safe collector of one round's updates
#[derive(Debug, Default)]
pub struct RoundAggregator {
    pending: Mutex<Vec<PendingUpdate>>,
}

impl RoundAggregator {
    /// Create an empty aggregator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one update
    pub fn add(&self, update: PendingUpdate) {
        self.pending.lock().push(update);
    }

    /// Append many updates under one lock
    pub fn extend<I: IntoIterator<Item = PendingUpdate>>(&self, updates: I) {
        self.pending.lock().extend(updates);
    }

    /// Union of two aggregators
    #[must_use]
    pub fn merge(self, other: RoundAggregator) -> RoundAggregator {
        let mut left = self.pending.into_inner();
        let mut right = other.pending.into_inner();
        if left.len() < right.len() {
            std::mem::swap(&mut left, &mut right);
        }
        left.append(&mut right);
        RoundAggregator {
            pending: Mutex::new(left),
        }
    }

    /// Whether no update is pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Number of pending updates
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Keep only the updates for which `keep` returns true.
    ///
    /// Returns the number of updates removed.
    pub fn retain<F: FnMut(&PendingUpdate) -> bool>(&self, keep: F) -> usize {
        let mut pending = self.pending.lock();
        let before = pending.len();
        pending.retain(keep);
        before - pending.len()
    }

    /// Take every pending update, grouped by destination, leaving the
    /// aggregator empty.
    ///
    /// Each group is sorted by `(cost, row, col)` so the grouping does not
    /// depend on the order in which updates arrived.
    pub fn drain_grouped(&self) -> UpdateMap {
        let drained = std::mem::take(&mut *self.pending.lock());
        let mut grouped = UpdateMap::default();
        for update in drained {
            grouped.entry(update.destination).or_default().push(update.entry);
        }
        for entries in grouped.values_mut() {
            entries.sort_by(|a, b| {
                a.cost
                    .total_cmp(&b.cost)
                    .then_with(|| a.row.cmp(&b.row))
                    .then_with(|| a.col.cmp(&b.col))
                    .then_with(|| a.friction.total_cmp(&b.friction))
            });
        }
        grouped
    }
}

impl FromIterator<PendingUpdate> for RoundAggregator {
    fn from_iter<I: IntoIterator<Item = PendingUpdate>>(iter: I) -> Self {
        Self {
            pending: Mutex::new(iter.into_iter().collect()),
        }
    }
}
