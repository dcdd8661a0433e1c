//! Geographic points and tile extents.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Geographic point in the layer's reference system.
///
/// `x` is the easting (longitude for geographic layers) and `y` the northing
/// (latitude).
pub type GeoPoint = Vector2<f64>;

/// Axis-aligned rectangle covered by one tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    /// West edge
    pub xmin: f64,
    /// South edge
    pub ymin: f64,
    /// East edge
    pub xmax: f64,
    /// North edge
    pub ymax: f64,
}

impl Extent {
    /// Create an extent from its four edges
    #[must_use]
    pub const fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Horizontal size
    #[must_use]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Vertical size
    #[must_use]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Central latitude (or northing)
    #[must_use]
    pub fn center_y(&self) -> f64 {
        (self.ymin + self.ymax) * 0.5
    }

    /// Whether `point` falls inside this extent.
    ///
    /// The west and north edges are inclusive, the east and south edges
    /// exclusive, so a point on a shared tile border belongs to exactly one
    /// tile.
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.x >= self.xmin && point.x < self.xmax && point.y <= self.ymax && point.y > self.ymin
    }

    /// Local `(col, row)` of `point` in a `cols`×`rows` raster covering this
    /// extent, clamped to the raster.
    ///
    /// Row 0 is the northern edge.
    #[must_use]
    pub fn cell_of(&self, point: &GeoPoint, cols: usize, rows: usize) -> (usize, usize) {
        let cell_w = self.width() / cols as f64;
        let cell_h = self.height() / rows as f64;
        let col = ((point.x - self.xmin) / cell_w).floor().max(0.0) as usize;
        let row = ((self.ymax - point.y) / cell_h).floor().max(0.0) as usize;
        (col.min(cols.saturating_sub(1)), row.min(rows.saturating_sub(1)))
    }

    /// Center of cell `(col, row)` of a `cols`×`rows` raster covering this extent
    #[must_use]
    pub fn cell_center(&self, col: usize, row: usize, cols: usize, rows: usize) -> GeoPoint {
        let cell_w = self.width() / cols as f64;
        let cell_h = self.height() / rows as f64;
        GeoPoint::new(
            self.xmin + (col as f64 + 0.5) * cell_w,
            self.ymax - (row as f64 + 0.5) * cell_h,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let extent = Extent::new(0.0, 0.0, 4.0, 4.0);
        assert!(extent.contains(&GeoPoint::new(0.0, 4.0)));
        assert!(!extent.contains(&GeoPoint::new(4.0, 2.0)));
        assert!(!extent.contains(&GeoPoint::new(2.0, 0.0)));
        assert!(!extent.contains(&GeoPoint::new(-0.1, 2.0)));
    }

    #[test]
    fn test_cell_of_uses_north_up_rows() {
        let extent = Extent::new(0.0, 0.0, 4.0, 4.0);
        assert_eq!(extent.cell_of(&GeoPoint::new(0.5, 3.5), 4, 4), (0, 0));
        assert_eq!(extent.cell_of(&GeoPoint::new(3.5, 0.5), 4, 4), (3, 3));
        assert_eq!(extent.cell_of(&GeoPoint::new(2.0, 2.0), 4, 4), (2, 2));
    }

    #[test]
    fn test_cell_center_round_trips_through_cell_of() {
        let extent = Extent::new(10.0, -5.0, 12.0, -3.0);
        let center = extent.cell_center(3, 1, 8, 8);
        assert_eq!(extent.cell_of(&center, 8, 8), (3, 1));
    }
}
