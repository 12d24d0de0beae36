//! Spatial partitioning
//!
//! A uniform grid of cells over the x/z plane, used as the broad phase
//! for collision queries and to pick per-cell levels of detail.

mod grid;
mod level_of_details;
mod spatial_partition;

pub use grid::{Grid, GridIndex, CellOccupancy, MeshRenderMode};
pub use level_of_details::{DetailLevel, LevelOfDetails};
pub use spatial_partition::{SpatialPartition, SpatialPartitionConfig};
