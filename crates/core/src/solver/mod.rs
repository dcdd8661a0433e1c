//! Cost-distance solver
//!
//! The solver is split along the natural seams of the tiled algorithm:
//!
//! - [`kernel`]: single-tile wavefront relaxation, pure and independently
//!   testable
//! - [`resolution`]: ground distance per cell, estimated once per run
//! - [`aggregator`]: concurrency-safe, mergeable collector of the updates a
//!   round emits
//! - [`driver`]: seeds the frontier and runs rounds to the fixed point
//!
//! # Example
//!
//! ```rust
//! use costdist_core::{
//!     CostDistance, CostDistanceConfig, FrictionLayer, GeoPoint, RegularLayout, TileData,
//!     TileKey, TileLayout,
//! };
//!
//! let layout = RegularLayout::unit_cells(2, 1, 4, 4);
//! let tiles: Vec<_> = layout
//!     .bounds()
//!     .keys()
//!     .map(|key| (key, TileData::with_value(4, 4, 1.0)))
//!     .collect();
//! let layer = FrictionLayer::from_tiles(layout, tiles)?;
//!
//! let config = CostDistanceConfig::default().with_resolution(1.0);
//! let result = CostDistance::new(&layer, config)?.run(&[GeoPoint::new(0.5, -0.5)])?;
//! assert_eq!(result.cost_at(TileKey::new(1, 0), 0, 0), Some(4.0));
//! # Ok::<(), costdist_core::CostDistanceError>(())
//! ```

pub mod aggregator;
pub mod driver;
pub mod kernel;
pub mod profiler;
pub mod queue;
pub mod resolution;

// Re-exports
pub use aggregator::{RoundAggregator, UpdateMap};
pub use driver::{
    cost_distance, CostDistance, CostDistanceLayer, FrictionLayer, Generation, RoundReport,
    Termination,
};
pub use kernel::{entry_improves, relax_tile, Connectivity, KernelOutput, KernelParams, KernelStats};
pub use profiler::ProfilerScope;
pub use queue::CostQueue;
pub use resolution::{estimate_resolution, great_circle_distance, meters_per_pixel, EARTH_RADIUS_METERS};
