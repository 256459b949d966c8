//! Spatial partitioning for broad-phase collision detection

pub mod bounds;
pub mod quadtree;
pub mod spatial_query;

pub use bounds::AABB;
pub use quadtree::{QuadTree, QuadTreeConfig, QuadTreeEntry, QuadTreeNode};
pub use spatial_query::{BruteForceSpatialQuery, QuadTreeSpatialQuery, SpatialEntry, SpatialQuery};
