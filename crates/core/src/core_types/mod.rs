//! Core types shared by the kernel, the aggregator and the round driver

pub mod entry;
pub mod geo;
pub mod key;

pub use entry::{local_cell, BoundaryEntry, PendingUpdate};
pub use geo::{Extent, GeoPoint};
pub use key::{Edge, GridBounds, TileKey};
