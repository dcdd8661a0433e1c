//! Work items exchanged between tiles.

use super::key::TileKey;
use serde::{Deserialize, Serialize};

/// A pending cost at a position in a tile's local frame.
///
/// Inside the tile, `(col, row)` names a cell: a source point or a neighbor
/// pushed by the kernel. An entry arriving from an adjacent tile has exactly
/// one coordinate on the out-of-range sentinel (`-1` or the tile size) and
/// names the cell just outside the edge it enters from; `friction` is then
/// the friction of that outside cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryEntry {
    /// Local column (may be -1 or `cols`)
    pub col: i64,
    /// Local row (may be -1 or `rows`)
    pub row: i64,
    /// Friction of the cell the entry sits on
    pub friction: f64,
    /// Cumulative cost at that cell
    pub cost: f64,
}

impl BoundaryEntry {
    /// Create an entry
    #[must_use]
    pub const fn new(col: i64, row: i64, friction: f64, cost: f64) -> Self {
        Self {
            col,
            row,
            friction,
            cost,
        }
    }

    /// Zero-cost entry for a source point at an in-tile cell
    #[must_use]
    pub const fn source(col: usize, row: usize, friction: f64) -> Self {
        Self::new(col as i64, row as i64, friction, 0.0)
    }

    /// The in-tile cell this entry names, or `None` for an edge-crossing entry
    #[must_use]
    pub fn local_cell(&self, cols: usize, rows: usize) -> Option<(usize, usize)> {
        local_cell(self.col, self.row, cols, rows)
    }
}

/// Convert signed local coordinates into a cell index of a `cols`×`rows` tile
#[must_use]
pub fn local_cell(col: i64, row: i64, cols: usize, rows: usize) -> Option<(usize, usize)> {
    let col = usize::try_from(col).ok().filter(|&c| c < cols)?;
    let row = usize::try_from(row).ok().filter(|&r| r < rows)?;
    Some((col, row))
}

/// A boundary entry tagged with the tile it must be delivered to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingUpdate {
    /// Receiving tile
    pub destination: TileKey,
    /// Entry in the receiving tile's frame
    pub entry: BoundaryEntry,
}

impl PendingUpdate {
    /// Create a new update
    #[must_use]
    pub const fn new(destination: TileKey, entry: BoundaryEntry) -> Self {
        Self { destination, entry }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_cell_rejects_sentinels() {
        assert_eq!(local_cell(-1, 2, 4, 4), None);
        assert_eq!(local_cell(4, 2, 4, 4), None);
        assert_eq!(local_cell(2, 4, 4, 4), None);
        assert_eq!(local_cell(3, 0, 4, 4), Some((3, 0)));
    }

    #[test]
    fn test_source_entry_has_zero_cost() {
        let entry = BoundaryEntry::source(1, 2, 3.5);
        assert_eq!(entry.cost, 0.0);
        assert_eq!(entry.local_cell(4, 4), Some((1, 2)));
    }
}
