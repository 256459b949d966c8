//! Abstract spatial query interface for broad-phase collision detection
//!
//! The physics system rebuilds the structure once per frame from fresh
//! bounds and asks it for candidate pairs. Any pair whose bounds overlap must
//! be reported; extra pairs are allowed.

use std::any::Any;

use crate::spatial::{QuadTree, QuadTreeConfig, AABB};

/// One broad-phase input: an item and its current world bounds
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry<T> {
    /// Caller's identifier
    pub item: T,
    /// World-space bounds for this frame
    pub bounds: AABB,
    /// Immovable items never pair with each other
    pub is_static: bool,
}

/// Abstract interface for spatial partitioning used in broad-phase collision detection
pub trait SpatialQuery<T>: Send + Sync {
    /// Replace the contents with `entries`. Entry order defines pair order.
    fn rebuild(&mut self, entries: &[SpatialEntry<T>]);

    /// Unique pairs whose bounds overlap, excluding static/static pairs,
    /// ordered by the position of their members in the last rebuild
    fn candidate_pairs(&self) -> Vec<(T, T)>;

    /// Query items within an AABB
    fn query_aabb(&self, aabb: &AABB) -> Vec<T>;

    /// Clear all items from the spatial structure
    fn clear(&mut self);

    /// Get the number of items in the structure
    fn entity_count(&self) -> usize;

    /// Downcast to Any for type-specific access (e.g., QuadTreeSpatialQuery)
    fn as_any(&self) -> &dyn Any;
}

/// Quad-tree implementation of SpatialQuery
#[derive(Debug, Clone)]
pub struct QuadTreeSpatialQuery<T> {
    tree: QuadTree<T>,
}

impl<T: Copy> QuadTreeSpatialQuery<T> {
    /// Create an empty quad-tree query with the given layout
    pub fn new(config: QuadTreeConfig) -> Self {
        Self {
            tree: QuadTree::new(config),
        }
    }

    /// Get a reference to the underlying quad-tree (for visualization, etc.)
    pub fn quadtree(&self) -> &QuadTree<T> {
        &self.tree
    }
}

impl<T: Copy + Send + Sync + 'static> SpatialQuery<T> for QuadTreeSpatialQuery<T> {
    fn rebuild(&mut self, entries: &[SpatialEntry<T>]) {
        self.tree.clear();
        for entry in entries {
            self.tree.insert(entry.item, entry.bounds, entry.is_static);
        }
    }

    fn candidate_pairs(&self) -> Vec<(T, T)> {
        self.tree.candidate_pairs()
    }

    fn query_aabb(&self, aabb: &AABB) -> Vec<T> {
        self.tree.query_aabb(aabb)
    }

    fn clear(&mut self) {
        self.tree.clear();
    }

    fn entity_count(&self) -> usize {
        self.tree.entity_count()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Tests every pair. Reference path used when the broad phase is disabled.
#[derive(Debug, Clone)]
pub struct BruteForceSpatialQuery<T> {
    entries: Vec<SpatialEntry<T>>,
}

impl<T> Default for BruteForceSpatialQuery<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> BruteForceSpatialQuery<T> {
    /// Create an empty brute-force query
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Copy + Send + Sync + 'static> SpatialQuery<T> for BruteForceSpatialQuery<T> {
    fn rebuild(&mut self, entries: &[SpatialEntry<T>]) {
        self.entries.clear();
        self.entries.extend_from_slice(entries);
    }

    fn candidate_pairs(&self) -> Vec<(T, T)> {
        let mut pairs = Vec::new();
        for (i, a) in self.entries.iter().enumerate() {
            for b in &self.entries[i + 1..] {
                if a.is_static && b.is_static {
                    continue;
                }
                if a.bounds.intersects(&b.bounds) {
                    pairs.push((a.item, b.item));
                }
            }
        }
        pairs
    }

    fn query_aabb(&self, aabb: &AABB) -> Vec<T> {
        self.entries
            .iter()
            .filter(|entry| entry.bounds.intersects(aabb))
            .map(|entry| entry.item)
            .collect()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn entity_count(&self) -> usize {
        self.entries.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
