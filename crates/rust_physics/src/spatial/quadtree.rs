//! Quad-tree spatial partitioning structure
//!
//! Divides the world's XZ plane into hierarchical square regions. An entry is
//! stored in every leaf its footprint overlaps, so two entries that share a
//! leaf are a potential collision pair. Height is ignored while partitioning
//! and only checked when pairs are emitted.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Vec2, Vec3};
use crate::spatial::AABB;

/// Configuration for quad-tree behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadTreeConfig {
    /// Half the side length of the square root region, centered on the origin
    pub world_half_size: f32,

    /// Maximum entries per leaf before subdivision
    pub max_entries_per_node: usize,

    /// Maximum subdivision depth
    pub max_depth: u32,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            world_half_size: 1024.0,
            max_entries_per_node: 6,
            max_depth: 6,
        }
    }
}

/// Item stored in the quad-tree with its world bounds
#[derive(Debug, Clone, Copy)]
pub struct QuadTreeEntry<T> {
    /// Caller's identifier for the item
    pub item: T,
    /// World-space bounds (the XZ footprint drives placement)
    pub bounds: AABB,
    /// Immovable items never pair with each other
    pub is_static: bool,
    /// Insertion order, used to emit pairs deterministically
    pub order: usize,
}

/// Single node in the quad-tree hierarchy
#[derive(Debug, Clone)]
pub struct QuadTreeNode<T> {
    /// Center of the node's square on the XZ plane
    pub center: Vec2,

    /// Half-size of the node's square on the XZ plane
    pub half_size: Vec2,

    /// Entries held by this node (leaves only)
    pub entries: Vec<QuadTreeEntry<T>>,

    /// Child nodes (4 quadrants), None if this is a leaf
    pub children: Option<Box<[QuadTreeNode<T>; 4]>>,

    /// Depth in the tree (0 = root)
    pub depth: u32,
}

impl<T: Copy> QuadTreeNode<T> {
    /// Create a new leaf node
    pub fn new(center: Vec2, half_size: Vec2, depth: u32) -> Self {
        Self {
            center,
            half_size,
            entries: Vec::new(),
            children: None,
            depth,
        }
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Does the XZ footprint of `bounds` touch this node's square
    pub fn overlaps(&self, bounds: &AABB) -> bool {
        let entry_center = bounds.center();
        let entry_half = bounds.extents();
        (entry_center.x - self.center.x).abs() <= entry_half.x + self.half_size.x
            && (entry_center.z - self.center.y).abs() <= entry_half.z + self.half_size.y
    }

    /// Split into 4 children and push the held entries down into them
    fn subdivide(&mut self) {
        if self.children.is_some() {
            return;
        }

        let quarter = self.half_size * 0.5;
        let depth = self.depth + 1;
        // Quadrant layout: bit 0 = +X, bit 1 = +Z
        let child = |index: usize| {
            let x_sign = if index & 1 != 0 { 1.0 } else { -1.0 };
            let z_sign = if index & 2 != 0 { 1.0 } else { -1.0 };
            QuadTreeNode::new(
                Vec2::new(self.center.x + quarter.x * x_sign, self.center.y + quarter.y * z_sign),
                quarter,
                depth,
            )
        };
        let mut children = Box::new([child(0), child(1), child(2), child(3)]);

        for entry in std::mem::take(&mut self.entries) {
            for child in children.iter_mut() {
                if child.overlaps(&entry.bounds) {
                    child.entries.push(entry);
                }
            }
        }

        self.children = Some(children);
    }

    /// Insert an entry into every leaf it overlaps
    pub fn insert(&mut self, entry: QuadTreeEntry<T>, config: &QuadTreeConfig) -> bool {
        if !self.overlaps(&entry.bounds) {
            return false;
        }

        if let Some(ref mut children) = self.children {
            let mut inserted = false;
            for child in children.iter_mut() {
                inserted |= child.insert(entry, config);
            }
            return inserted;
        }

        self.entries.push(entry);
        if self.entries.len() > config.max_entries_per_node && self.depth < config.max_depth {
            self.subdivide();
        }
        true
    }

    /// Visit the contents of every leaf
    pub fn operate_on_contents<F>(&self, func: &mut F)
    where
        F: FnMut(&[QuadTreeEntry<T>]),
    {
        match self.children {
            Some(ref children) => {
                for child in children.iter() {
                    child.operate_on_contents(func);
                }
            }
            None => {
                if !self.entries.is_empty() {
                    func(&self.entries);
                }
            }
        }
    }

    /// Collect entries whose bounds intersect `bounds`
    pub fn query_aabb(&self, bounds: &AABB, results: &mut Vec<QuadTreeEntry<T>>) {
        if !self.overlaps(bounds) {
            return;
        }

        for entry in &self.entries {
            if entry.bounds.intersects(bounds) {
                results.push(*entry);
            }
        }

        if let Some(ref children) = self.children {
            for child in children.iter() {
                child.query_aabb(bounds, results);
            }
        }
    }

    /// Count stored entries (an entry spanning several leaves counts once per leaf)
    pub fn count_entries(&self) -> usize {
        let mut count = self.entries.len();

        if let Some(ref children) = self.children {
            for child in children.iter() {
                count += child.count_entries();
            }
        }

        count
    }

    /// Get all leaf nodes (for visualization)
    pub fn get_all_leaves<'a>(&'a self, leaves: &mut Vec<&'a QuadTreeNode<T>>) {
        if self.is_leaf() {
            leaves.push(self);
        } else if let Some(ref children) = self.children {
            for child in children.iter() {
                child.get_all_leaves(leaves);
            }
        }
    }
}

/// Quad-tree over the XZ plane
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    /// Root node covering the configured world square
    pub root: QuadTreeNode<T>,

    /// Configuration
    config: QuadTreeConfig,

    /// Entries whose footprint misses the root square entirely
    outside: Vec<QuadTreeEntry<T>>,

    /// Number of distinct entries inserted
    len: usize,
}

impl<T: Copy> QuadTree<T> {
    /// Create a new quad-tree with the given configuration
    pub fn new(config: QuadTreeConfig) -> Self {
        let half = Vec2::new(config.world_half_size, config.world_half_size);
        Self {
            root: QuadTreeNode::new(Vec2::zeros(), half, 0),
            config,
            outside: Vec::new(),
            len: 0,
        }
    }

    /// Insert an item with its bounds
    pub fn insert(&mut self, item: T, bounds: AABB, is_static: bool) {
        let entry = QuadTreeEntry {
            item,
            bounds,
            is_static,
            order: self.len,
        };
        self.len += 1;

        if !self.root.insert(entry, &self.config) {
            // Outside the partitioned square: still tested, just not partitioned
            log::trace!("Quad-tree entry at {:?} lies outside the world square", bounds.center());
            self.outside.push(entry);
        }
    }

    /// Every pair of entries that share a leaf and whose full 3D bounds touch.
    /// Static/static pairs are skipped. Pairs are unique and ordered by
    /// insertion order, first element inserted first.
    pub fn candidate_pairs(&self) -> Vec<(T, T)> {
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut pairs: Vec<((usize, usize), (T, T))> = Vec::new();

        let mut consider = |a: &QuadTreeEntry<T>, b: &QuadTreeEntry<T>| {
            if a.order == b.order || (a.is_static && b.is_static) {
                return;
            }
            if !a.bounds.intersects(&b.bounds) {
                return;
            }
            let (first, second) = if a.order < b.order { (a, b) } else { (b, a) };
            if seen.insert((first.order, second.order)) {
                pairs.push(((first.order, second.order), (first.item, second.item)));
            }
        };

        self.root.operate_on_contents(&mut |entries| {
            for i in 0..entries.len() {
                for j in (i + 1)..entries.len() {
                    consider(&entries[i], &entries[j]);
                }
            }
        });

        if !self.outside.is_empty() {
            let mut everything = Vec::new();
            self.root.operate_on_contents(&mut |entries| everything.extend_from_slice(entries));
            everything.extend_from_slice(&self.outside);
            for outside in &self.outside {
                for other in &everything {
                    consider(outside, other);
                }
            }
        }

        pairs.sort_by_key(|(order, _)| *order);
        pairs.into_iter().map(|(_, pair)| pair).collect()
    }

    /// Items whose bounds intersect `bounds` (deduplicated)
    pub fn query_aabb(&self, bounds: &AABB) -> Vec<T> {
        let mut hits = Vec::new();
        self.root.query_aabb(bounds, &mut hits);
        hits.extend(self.outside.iter().filter(|e| e.bounds.intersects(bounds)).copied());

        let mut seen = HashSet::new();
        hits.sort_by_key(|e| e.order);
        hits.into_iter()
            .filter(|e| seen.insert(e.order))
            .map(|e| e.item)
            .collect()
    }

    /// Get all leaf nodes (for visualization)
    pub fn get_all_leaves(&self) -> Vec<&QuadTreeNode<T>> {
        let mut leaves = Vec::new();
        self.root.get_all_leaves(&mut leaves);
        leaves
    }

    /// Number of distinct entries inserted
    pub fn entity_count(&self) -> usize {
        self.len
    }

    /// Configuration in use
    pub fn config(&self) -> &QuadTreeConfig {
        &self.config
    }

    /// Clear the quad-tree, keeping its configuration
    pub fn clear(&mut self) {
        self.root = QuadTreeNode::new(self.root.center, self.root.half_size, 0);
        self.outside.clear();
        self.len = 0;
    }
}

/// Footprint helper: a cube of half-size `radius` around `center`
pub fn cube_bounds(center: Vec3, radius: f32) -> AABB {
    AABB::from_center_extents(center, Vec3::new(radius, radius, radius))
}
