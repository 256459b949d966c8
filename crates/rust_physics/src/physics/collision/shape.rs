//! Collision volumes attached to physics objects
//!
//! Shapes store their own dimensions and take position and orientation from
//! the owning object's [`Transform`] at test time. Transform scale is not
//! applied to shapes.

use crate::foundation::math::{Transform, Vec3};
use crate::spatial::AABB;

/// Collision volume kinds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionShape {
    /// Sphere around the object's position
    Sphere {
        /// Sphere radius
        radius: f32,
    },
    /// World-aligned box. Ignores the object's orientation.
    AxisAlignedBox {
        /// Half size on each world axis
        half_extents: Vec3,
    },
    /// Box that follows the object's orientation
    OrientedBox {
        /// Half size on each local axis
        half_extents: Vec3,
    },
    /// Capsule along the object's local Y axis
    Capsule {
        /// Half of the total height, caps included
        half_height: f32,
        /// Radius of the cylinder and both caps
        radius: f32,
    },
}

/// Discriminant of [`CollisionShape`], handy for logs and dispatch tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// [`CollisionShape::Sphere`]
    Sphere,
    /// [`CollisionShape::AxisAlignedBox`]
    AxisAlignedBox,
    /// [`CollisionShape::OrientedBox`]
    OrientedBox,
    /// [`CollisionShape::Capsule`]
    Capsule,
}

impl CollisionShape {
    /// Sphere shape
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// World-aligned box shape
    pub fn aabb(half_extents: Vec3) -> Self {
        Self::AxisAlignedBox { half_extents }
    }

    /// Oriented box shape
    pub fn obb(half_extents: Vec3) -> Self {
        Self::OrientedBox { half_extents }
    }

    /// Capsule shape. `half_height` is clamped so the segment is never negative.
    pub fn capsule(half_height: f32, radius: f32) -> Self {
        Self::Capsule {
            half_height: half_height.max(radius),
            radius,
        }
    }

    /// Which variant this is
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Sphere { .. } => ShapeKind::Sphere,
            Self::AxisAlignedBox { .. } => ShapeKind::AxisAlignedBox,
            Self::OrientedBox { .. } => ShapeKind::OrientedBox,
            Self::Capsule { .. } => ShapeKind::Capsule,
        }
    }

    /// World-space bounds of the shape placed at `transform`
    pub fn world_aabb(&self, transform: &Transform) -> AABB {
        let position = transform.position;
        match *self {
            Self::Sphere { radius } => {
                AABB::from_center_extents(position, Vec3::new(radius, radius, radius))
            }
            Self::AxisAlignedBox { half_extents } => {
                AABB::from_center_extents(position, half_extents)
            }
            Self::OrientedBox { half_extents } => {
                let rotation = transform.rotation_matrix().abs();
                AABB::from_center_extents(position, rotation * half_extents)
            }
            Self::Capsule { radius, .. } => {
                let (bottom, top) = self.capsule_segment(transform).unwrap_or((position, position));
                let pad = Vec3::new(radius, radius, radius);
                AABB::new(bottom.inf(&top) - pad, bottom.sup(&top) + pad)
            }
        }
    }

    /// World-space end points of a capsule's inner segment (bottom, top).
    /// `None` for every other shape.
    pub fn capsule_segment(&self, transform: &Transform) -> Option<(Vec3, Vec3)> {
        match *self {
            Self::Capsule { half_height, radius } => {
                let offset = transform.up() * (half_height - radius).max(0.0);
                Some((transform.position - offset, transform.position + offset))
            }
            _ => None,
        }
    }

    /// Whether the narrow phase can produce contacts for this pair (either order)
    pub fn pair_supported(a: ShapeKind, b: ShapeKind) -> bool {
        use ShapeKind::{AxisAlignedBox, Capsule, OrientedBox};
        !matches!(
            (a, b),
            (OrientedBox, OrientedBox)
                | (OrientedBox, AxisAlignedBox)
                | (AxisAlignedBox, OrientedBox)
                | (OrientedBox, Capsule)
                | (Capsule, OrientedBox)
                | (Capsule, Capsule)
        )
    }
}
