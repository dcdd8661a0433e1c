//! Tiled Cost-Distance Core Library
//!
//! Computes a cost-distance raster over a grid too large to process as one
//! array: for every cell, the minimum cumulative travel cost from a set of
//! source points, where each cell carries a friction (cost per unit
//! distance).
//!
//! The grid is partitioned into equally sized tiles. Each tile is relaxed
//! independently by a priority-queue wavefront kernel; tiles exchange the
//! costs of their edge cells in synchronized rounds until a round produces no
//! further updates.
//!
//! ## Layout
//!
//! - [`core_types`]: tile keys, grid bounds, extents, boundary entries
//! - [`grid`]: tile rasters and the tile layout collaborator
//! - [`solver`]: kernel, resolution estimate, round aggregator and driver
//! - [`config`] / [`error`]: run configuration and error type

// Core types and utilities
pub mod core_types;

pub mod config;
pub mod error;
pub mod grid;
pub mod solver;

// Re-export core types
pub use core_types::{BoundaryEntry, Edge, Extent, GeoPoint, GridBounds, PendingUpdate, TileKey};

// Re-export configuration and errors
pub use config::CostDistanceConfig;
pub use error::{CostDistanceError, Result};

// Re-export grid and solver types
pub use grid::{CostTile, FrictionTile, KeyedTile, Raster, RegularLayout, TileData, TileLayout, UNREACHED};
pub use solver::{
    cost_distance, relax_tile, Connectivity, CostDistance, CostDistanceLayer, CostQueue,
    FrictionLayer, KernelParams, RoundAggregator, RoundReport, Termination,
};
