//! Ray and plane primitives

use crate::foundation::math::{utils, Vec3};

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// Unit direction, or zero for a ray that can never hit
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray; the direction is normalized
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: utils::try_normalize(direction).unwrap_or_else(Vec3::zeros),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// False when built from a zero-length direction
    pub fn is_valid(&self) -> bool {
        self.direction != Vec3::zeros()
    }
}

/// Where a ray met a volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayCollision {
    /// World-space hit point
    pub point: Vec3,
    /// Signed distance along the ray
    pub distance: f32,
}

/// Infinite plane `dot(normal, p) + distance = 0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal
    pub normal: Vec3,
    /// Offset from the origin along `-normal`
    pub distance: f32,
}

impl Plane {
    /// Plane through `point` facing `normal`
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Option<Self> {
        let normal = utils::try_normalize(normal)?;
        Some(Self {
            normal,
            distance: -normal.dot(&point),
        })
    }

    /// Plane through three points, wound counter-clockwise around the normal.
    /// `None` for collinear points.
    pub fn from_triangle(v0: Vec3, v1: Vec3, v2: Vec3) -> Option<Self> {
        Self::from_point_normal(v0, (v1 - v0).cross(&(v2 - v0)))
    }

    /// Signed distance of `point` from the plane
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.distance
    }

    /// The point of the plane closest to the origin
    pub fn point_on_plane(&self) -> Vec3 {
        self.normal * -self.distance
    }
}
