//! Axis-aligned bounding box used for broad-phase footprints

use crate::foundation::math::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box stored as min/max corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given half-size
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Grow the box by `amount` on every side
    pub fn expanded(&self, amount: f32) -> Self {
        let pad = Vec3::new(amount, amount, amount);
        Self::new(self.min - pad, self.max + pad)
    }

    /// Grow the box by a per-axis amount on every side
    pub fn expanded_by(&self, amount: Vec3) -> Self {
        Self::new(self.min - amount, self.max + amount)
    }

    /// Whether `point` lies inside or on the box
    pub fn contains_point(&self, point: Vec3) -> bool {
        (0..3).all(|axis| (self.min[axis]..=self.max[axis]).contains(&point[axis]))
    }

    /// Overlap test; touching boxes count as overlapping
    pub fn intersects(&self, other: &AABB) -> bool {
        (0..3).all(|axis| self.min[axis] <= other.max[axis] && other.min[axis] <= self.max[axis])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects_is_symmetric() {
        let a = AABB::from_center_extents(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let b = AABB::from_center_extents(Vec3::new(1.5, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let c = AABB::from_center_extents(Vec3::new(5.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        assert!(a.intersects(&b) && b.intersects(&a));
        assert!(!a.intersects(&c) && !c.intersects(&a));
    }

    #[test]
    fn test_contains_point_includes_faces() {
        let bounds = AABB::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 4.0, 1.0));
        assert!(bounds.contains_point(Vec3::new(1.0, 4.0, 0.0)));
        assert!(!bounds.contains_point(Vec3::new(0.0, 4.1, 0.0)));
        assert_eq!(bounds.center(), Vec3::new(0.0, 2.0, 0.0));
    }
}
