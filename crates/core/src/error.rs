//! Error types for cost-distance runs.

use crate::core_types::{GridBounds, TileKey};
use thiserror::Error;

/// Errors surfaced by the resolution estimator and the round driver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CostDistanceError {
    /// No sample tile to establish a ground resolution from
    #[error("cannot estimate ground resolution: the friction layer has no tiles")]
    EmptyLayer,

    /// The sample tile has no columns
    #[error("cannot estimate ground resolution: tile {key} has zero columns")]
    ZeroWidthTile {
        /// Sample tile
        key: TileKey,
    },

    /// The sample tile's geographic extent has no usable width
    #[error("cannot estimate ground resolution: extent of tile {key} is degenerate")]
    DegenerateExtent {
        /// Sample tile
        key: TileKey,
    },

    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A friction tile does not match the layout's tile size
    #[error(
        "tile {key} is {actual_cols}x{actual_rows} cells, layout expects {expected_cols}x{expected_rows}"
    )]
    TileDimensionMismatch {
        /// Offending tile
        key: TileKey,
        /// Layout tile width
        expected_cols: usize,
        /// Layout tile height
        expected_rows: usize,
        /// Tile width
        actual_cols: usize,
        /// Tile height
        actual_rows: usize,
    },

    /// A friction tile lies outside the layout's grid bounds
    #[error("tile {key} lies outside grid bounds {bounds}")]
    TileOutsideBounds {
        /// Offending tile
        key: TileKey,
        /// Layout bounds
        bounds: GridBounds,
    },

    /// The round guard tripped before a fixed point was reached
    #[error("no fixed point reached after {rounds} rounds")]
    RoundLimitExceeded {
        /// Rounds completed
        rounds: usize,
    },
}

/// Result alias for this crate
pub type Result<T> = std::result::Result<T, CostDistanceError>;
