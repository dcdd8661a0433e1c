//! Ground resolution estimate
//!
//! Friction is a cost per unit of ground distance, so the kernel needs the
//! distance covered by one cell. All tiles of a layer are assumed to share
//! roughly the same resolution; it is estimated once per run from a single
//! sample tile as the great-circle distance across the tile's horizontal
//! extent (at its central latitude) divided by its column count.

use crate::core_types::{Extent, GeoPoint, TileKey};
use crate::error::{CostDistanceError, Result};
use crate::grid::{FrictionTile, TileLayout};

/// Spherical Earth radius (WGS84 semi-major axis), meters
pub const EARTH_RADIUS_METERS: f64 = 6378137.0;

/// Haversine distance in meters between two `(longitude, latitude)` points
/// given in degrees.
#[must_use]
pub fn great_circle_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat_a, lat_b) = (a.y.to_radians(), b.y.to_radians());
    let d_lat = lat_b - lat_a;
    let d_lon = (b.x - a.x).to_radians();
    let h = (d_lat * 0.5).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon * 0.5).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// Meters per pixel of a `cols`-wide tile covering `extent` (degrees).
///
/// # Errors
///
/// [`CostDistanceError::ZeroWidthTile`] if `cols` is zero and
/// [`CostDistanceError::DegenerateExtent`] if the extent has no finite,
/// positive ground width.
pub fn meters_per_pixel(key: TileKey, extent: &Extent, cols: usize) -> Result<f64> {
    if cols == 0 {
        return Err(CostDistanceError::ZeroWidthTile { key });
    }
    let lat = extent.center_y();
    let meters = great_circle_distance(GeoPoint::new(extent.xmin, lat), GeoPoint::new(extent.xmax, lat));
    if !(meters.is_finite() && meters > 0.0) {
        return Err(CostDistanceError::DegenerateExtent { key });
    }
    Ok(meters / cols as f64)
}

/// Estimate the layer's ground resolution from one sample tile.
///
/// The sample is the tile with the smallest key, so the estimate does not
/// depend on map iteration order.
///
/// # Errors
///
/// [`CostDistanceError::EmptyLayer`] if `tiles` yields nothing, otherwise the
/// errors of [`meters_per_pixel`].
pub fn estimate_resolution<'a, L, I>(layout: &L, tiles: I) -> Result<f64>
where
    L: TileLayout + ?Sized,
    I: IntoIterator<Item = (&'a TileKey, &'a FrictionTile)>,
{
    let (key, tile) = tiles
        .into_iter()
        .min_by_key(|(key, _)| **key)
        .ok_or(CostDistanceError::EmptyLayer)?;
    meters_per_pixel(*key, &layout.geographic_extent(*key), tile.cols())
}
