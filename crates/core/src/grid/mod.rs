//! Tile rasters and the tile layout collaborator

pub mod layout;
pub mod tile_data;

// Re-export main types
pub use layout::{RegularLayout, TileLayout};
pub use tile_data::{is_passable, CostTile, FrictionTile, KeyedTile, Raster, TileData, UNREACHED};
