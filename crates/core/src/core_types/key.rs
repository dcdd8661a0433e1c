//! Tile addressing: keys, grid bounds and tile edges.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a tile in the global tile grid.
///
/// Columns grow eastward and rows grow southward, matching the raster
/// orientation of the cells inside each tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileKey {
    /// Tile column
    pub col: i32,
    /// Tile row
    pub row: i32,
}

impl TileKey {
    /// Create a new tile key
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Manhattan distance between two keys, in tiles
    #[must_use]
    pub fn manhattan_distance(&self, other: TileKey) -> u32 {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Inclusive minimum/maximum tile keys of a dataset.
///
/// Propagation to a key outside these bounds is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridBounds {
    /// Smallest key (north-west corner)
    pub min: TileKey,
    /// Largest key (south-east corner)
    pub max: TileKey,
}

impl GridBounds {
    /// Create bounds from the two corner keys
    #[must_use]
    pub const fn new(min: TileKey, max: TileKey) -> Self {
        Self { min, max }
    }

    /// Whether `key` lies inside the bounds (inclusive on both ends)
    #[must_use]
    pub fn contains(&self, key: TileKey) -> bool {
        key.col >= self.min.col
            && key.col <= self.max.col
            && key.row >= self.min.row
            && key.row <= self.max.row
    }

    /// Number of tile columns covered
    #[must_use]
    pub fn layout_cols(&self) -> usize {
        (self.max.col - self.min.col + 1).max(0) as usize
    }

    /// Number of tile rows covered
    #[must_use]
    pub fn layout_rows(&self) -> usize {
        (self.max.row - self.min.row + 1).max(0) as usize
    }

    /// Largest Manhattan distance between any two keys in the bounds
    #[must_use]
    pub fn diameter(&self) -> u32 {
        self.min.manhattan_distance(self.max)
    }

    /// All keys inside the bounds in row-major order
    pub fn keys(&self) -> impl Iterator<Item = TileKey> + '_ {
        (self.min.row..=self.max.row)
            .flat_map(move |row| (self.min.col..=self.max.col).map(move |col| TileKey::new(col, row)))
    }
}

impl fmt::Display for GridBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

/// One of the four edges of a tile.
///
/// Only edge-adjacent tiles exchange updates; tiles that touch at a corner
/// never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    /// Column 0
    West,
    /// Column `cols - 1`
    East,
    /// Row 0
    North,
    /// Row `rows - 1`
    South,
}

impl Edge {
    /// All four edges
    pub const ALL: [Edge; 4] = [Edge::West, Edge::East, Edge::North, Edge::South];

    /// Key of the tile across this edge (may be outside the grid bounds)
    #[must_use]
    pub const fn neighbor(self, key: TileKey) -> TileKey {
        match self {
            Edge::West => TileKey::new(key.col - 1, key.row),
            Edge::East => TileKey::new(key.col + 1, key.row),
            Edge::North => TileKey::new(key.col, key.row - 1),
            Edge::South => TileKey::new(key.col, key.row + 1),
        }
    }

    /// The edge of the neighboring tile that faces this one
    #[must_use]
    pub const fn opposite(self) -> Edge {
        match self {
            Edge::West => Edge::East,
            Edge::East => Edge::West,
            Edge::North => Edge::South,
            Edge::South => Edge::North,
        }
    }

    /// Edges that the cell `(col, row)` of a `cols`×`rows` tile lies on.
    ///
    /// A corner cell lies on two edges; a cell of a single-column tile lies
    /// on both `West` and `East`.
    pub fn touching(col: usize, row: usize, cols: usize, rows: usize) -> impl Iterator<Item = Edge> {
        let on = [col == 0, col + 1 == cols, row == 0, row + 1 == rows];
        Edge::ALL
            .into_iter()
            .zip(on)
            .filter_map(|(edge, hit)| hit.then_some(edge))
    }

    /// Local coordinates of cell `(col, row)` expressed in the frame of the
    /// tile across this edge.
    ///
    /// The crossing axis lands on the out-of-range sentinel (`-1` or the tile
    /// size) of the receiving tile; the other axis is unchanged.
    #[must_use]
    pub fn crossing_coords(self, col: usize, row: usize, cols: usize, rows: usize) -> (i64, i64) {
        let (col, row) = (col as i64, row as i64);
        match self {
            Edge::West => (cols as i64, row),
            Edge::East => (-1, row),
            Edge::North => (col, rows as i64),
            Edge::South => (col, -1),
        }
    }
}
