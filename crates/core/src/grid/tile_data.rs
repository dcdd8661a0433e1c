//! Tile raster storage
//!
//! A tile is a `cols`×`rows` block of `f64` cells stored as a flat `Vec<f64>`
//! in row-major order. The same container holds friction (read-only input)
//! and cumulative cost (one generation per round).

use crate::core_types::TileKey;

/// Cost of a cell no source has reached
pub const UNREACHED: f64 = f64::INFINITY;

/// Whether a friction value can be traversed.
///
/// NaN, infinite and negative frictions mark no-data barriers.
#[inline]
#[must_use]
pub fn is_passable(friction: f64) -> bool {
    friction.is_finite() && friction >= 0.0
}

/// Read access to a 2-D numeric tile
pub trait Raster {
    /// Width in cells
    fn cols(&self) -> usize;
    /// Height in cells
    fn rows(&self) -> usize;
    /// Value at `(col, row)`
    fn get(&self, col: usize, row: usize) -> f64;
}

/// Anything that carries a tile key and a raster.
///
/// This is the only capability the driver needs from the surrounding layer
/// subsystem's key/tile types.
pub trait KeyedTile {
    /// Raster type of the tile
    type Tile: Raster;

    /// Position of the tile in the grid
    fn key(&self) -> TileKey;

    /// Cell values of the tile
    fn tile(&self) -> &Self::Tile;
}

impl<R: Raster> KeyedTile for (TileKey, R) {
    type Tile = R;

    fn key(&self) -> TileKey {
        self.0
    }

    fn tile(&self) -> &R {
        &self.1
    }
}

/// Row-major tile storage
#[derive(Debug, Clone, PartialEq)]
pub struct TileData {
    /// Cell values in row-major order (row * cols + col)
    data: Vec<f64>,
    cols: usize,
    rows: usize,
}

/// Read-only friction tile (cost per unit distance)
pub type FrictionTile = TileData;

/// Cumulative cost tile
pub type CostTile = TileData;

impl TileData {
    /// Create a tile with every cell set to `value`
    #[must_use]
    pub fn with_value(cols: usize, rows: usize, value: f64) -> Self {
        Self {
            data: vec![value; cols * rows],
            cols,
            rows,
        }
    }

    /// Create an all-unreached cost tile
    #[must_use]
    pub fn unreached(cols: usize, rows: usize) -> Self {
        Self::with_value(cols, rows, UNREACHED)
    }

    /// Create a tile from row-major values
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != cols * rows`
    #[must_use]
    pub fn from_vec(cols: usize, rows: usize, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), cols * rows, "Tile data length mismatch");
        Self { data, cols, rows }
    }

    /// Create a tile by evaluating `f(col, row)` for every cell
    #[must_use]
    pub fn from_fn(cols: usize, rows: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                data.push(f(col, row));
            }
        }
        Self { data, cols, rows }
    }

    /// Copy any raster into owned storage
    #[must_use]
    pub fn from_raster<R: Raster + ?Sized>(raster: &R) -> Self {
        Self::from_fn(raster.cols(), raster.rows(), |col, row| raster.get(col, row))
    }

    /// Width in cells
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Height in cells
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get reference to cell data
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Get value at `(col, row)`
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[must_use]
    pub fn get(&self, col: usize, row: usize) -> f64 {
        assert!(col < self.cols && row < self.rows, "Coordinates out of bounds");
        self.data[row * self.cols + col]
    }

    /// Set value at `(col, row)`
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    pub fn set(&mut self, col: usize, row: usize, value: f64) {
        assert!(col < self.cols && row < self.rows, "Coordinates out of bounds");
        self.data[row * self.cols + col] = value;
    }

    /// Fill entire tile with a value
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Whether cell `(col, row)` holds a finite cost
    #[must_use]
    pub fn is_reached(&self, col: usize, row: usize) -> bool {
        self.get(col, row).is_finite()
    }

    /// Number of cells holding a finite value
    #[must_use]
    pub fn reached_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_finite()).count()
    }

    /// Same dimensions as `other`
    #[must_use]
    pub fn same_shape(&self, other: &TileData) -> bool {
        self.cols == other.cols && self.rows == other.rows
    }
}

impl Raster for TileData {
    fn cols(&self) -> usize {
        self.cols
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn get(&self, col: usize, row: usize) -> f64 {
        TileData::get(self, col, row)
    }
}
