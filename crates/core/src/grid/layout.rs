//! Tile layout collaborator
//!
//! The layout maps tile keys to extents and knows the global grid bounds.
//! Real deployments implement [`TileLayout`] over their own tiling scheme;
//! [`RegularLayout`] covers the common case of equally sized tiles laid over
//! one rectangular extent.

use crate::core_types::{Edge, Extent, GridBounds, TileKey};
use serde::{Deserialize, Serialize};

/// Geometry of a tiled layer
pub trait TileLayout: Send + Sync {
    /// Width of every tile in cells
    fn tile_cols(&self) -> usize;

    /// Height of every tile in cells
    fn tile_rows(&self) -> usize;

    /// Minimum/maximum tile keys of the dataset
    fn bounds(&self) -> GridBounds;

    /// Extent of `key` in the layer's reference system
    fn extent(&self, key: TileKey) -> Extent;

    /// Extent of `key` in geographic degrees (longitude/latitude).
    ///
    /// Layers stored in a projected system reproject here; the default
    /// assumes the layer is already geographic.
    fn geographic_extent(&self, key: TileKey) -> Extent {
        self.extent(key)
    }

    /// Key across `edge` of `key`, or `None` past the edge of the dataset
    fn neighbor(&self, key: TileKey, edge: Edge) -> Option<TileKey> {
        let next = edge.neighbor(key);
        self.bounds().contains(next).then_some(next)
    }
}

/// Equally sized tiles covering one rectangular extent.
///
/// Key `(0, 0)` is the north-west tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularLayout {
    extent: Extent,
    layout_cols: u32,
    layout_rows: u32,
    tile_cols: usize,
    tile_rows: usize,
}

impl RegularLayout {
    /// Create a layout of `layout_cols`×`layout_rows` tiles, each
    /// `tile_cols`×`tile_rows` cells, covering `extent`.
    ///
    /// # Panics
    ///
    /// Panics if any count is zero
    #[must_use]
    pub fn new(
        extent: Extent,
        layout_cols: u32,
        layout_rows: u32,
        tile_cols: usize,
        tile_rows: usize,
    ) -> Self {
        assert!(
            layout_cols > 0 && layout_rows > 0 && tile_cols > 0 && tile_rows > 0,
            "Layout dimensions must be positive"
        );
        Self {
            extent,
            layout_cols,
            layout_rows,
            tile_cols,
            tile_rows,
        }
    }

    /// Layout where every cell is a unit square and the north-west corner
    /// sits at `(0, 0)`; rows extend toward negative `y`.
    #[must_use]
    pub fn unit_cells(layout_cols: u32, layout_rows: u32, tile_cols: usize, tile_rows: usize) -> Self {
        let width = f64::from(layout_cols) * tile_cols as f64;
        let height = f64::from(layout_rows) * tile_rows as f64;
        Self::new(
            Extent::new(0.0, -height, width, 0.0),
            layout_cols,
            layout_rows,
            tile_cols,
            tile_rows,
        )
    }

    /// Extent of the whole layer
    #[must_use]
    pub fn layer_extent(&self) -> Extent {
        self.extent
    }

    /// Size of one cell as `(width, height)` in layer units
    #[must_use]
    pub fn cell_size(&self) -> (f64, f64) {
        let cols = f64::from(self.layout_cols) * self.tile_cols as f64;
        let rows = f64::from(self.layout_rows) * self.tile_rows as f64;
        (self.extent.width() / cols, self.extent.height() / rows)
    }
}

impl TileLayout for RegularLayout {
    fn tile_cols(&self) -> usize {
        self.tile_cols
    }

    fn tile_rows(&self) -> usize {
        self.tile_rows
    }

    fn bounds(&self) -> GridBounds {
        GridBounds::new(
            TileKey::new(0, 0),
            TileKey::new(self.layout_cols as i32 - 1, self.layout_rows as i32 - 1),
        )
    }

    fn extent(&self, key: TileKey) -> Extent {
        let tile_w = self.extent.width() / f64::from(self.layout_cols);
        let tile_h = self.extent.height() / f64::from(self.layout_rows);
        let xmin = self.extent.xmin + f64::from(key.col) * tile_w;
        let ymax = self.extent.ymax - f64::from(key.row) * tile_h;
        Extent::new(xmin, ymax - tile_h, xmin + tile_w, ymax)
    }
}
