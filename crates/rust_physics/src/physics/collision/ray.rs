//! Ray queries against planes and collision volumes

use super::primitives::{Plane, Ray, RayCollision};
use super::shape::CollisionShape;
use crate::foundation::math::{utils, Transform, Vec3};

/// Tolerance used when checking a slab hit lies on the box
const BOX_EPSILON: f32 = 1.0e-4;

/// Ray against an infinite plane. Hits behind the origin are reported with a
/// negative distance; only a ray parallel to the plane misses.
pub fn ray_plane(ray: &Ray, plane: &Plane) -> Option<RayCollision> {
    let ln = plane.normal.dot(&ray.direction);
    if ln == 0.0 {
        return None;
    }
    let to_plane = plane.point_on_plane() - ray.origin;
    let distance = to_plane.dot(&plane.normal) / ln;
    Some(RayCollision {
        point: ray.point_at(distance),
        distance,
    })
}

/// Ray against a world-aligned box given by centre and half size
pub fn ray_box(ray: &Ray, box_position: Vec3, half_extents: Vec3) -> Option<RayCollision> {
    let box_min = box_position - half_extents;
    let box_max = box_position + half_extents;

    // Entry distance for each slab; axes the ray runs parallel to stay at -1
    let mut t_values = Vec3::new(-1.0, -1.0, -1.0);
    for axis in 0..3 {
        let direction = ray.direction[axis];
        if direction > 0.0 {
            t_values[axis] = (box_min[axis] - ray.origin[axis]) / direction;
        } else if direction < 0.0 {
            t_values[axis] = (box_max[axis] - ray.origin[axis]) / direction;
        }
    }

    let best_t = t_values.max();
    if best_t < 0.0 {
        return None;
    }

    let intersection = ray.point_at(best_t);
    for axis in 0..3 {
        if intersection[axis] + BOX_EPSILON < box_min[axis]
            || intersection[axis] - BOX_EPSILON > box_max[axis]
        {
            return None;
        }
    }

    Some(RayCollision {
        point: intersection,
        distance: best_t,
    })
}

/// Ray against a box following `transform`'s orientation
pub fn ray_obb(ray: &Ray, transform: &Transform, half_extents: Vec3) -> Option<RayCollision> {
    let local_ray = Ray {
        origin: transform.to_local(ray.origin),
        direction: transform.rotation.inverse() * ray.direction,
    };

    ray_box(&local_ray, Vec3::zeros(), half_extents).map(|hit| RayCollision {
        point: transform.to_world(hit.point),
        distance: hit.distance,
    })
}

/// Ray against a sphere. Spheres whose centre lies behind the origin are missed.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<RayCollision> {
    let to_center = center - ray.origin;
    let projection = to_center.dot(&ray.direction);
    if projection < 0.0 {
        return None;
    }

    let closest = ray.point_at(projection);
    let center_distance = (closest - center).magnitude();
    if center_distance > radius {
        return None;
    }

    let offset = (radius * radius - center_distance * center_distance).max(0.0).sqrt();
    let distance = projection - offset;
    Some(RayCollision {
        point: ray.point_at(distance),
        distance,
    })
}

/// Ray against a capsule. The ray meets the plane that holds the capsule
/// axis and faces the ray; that crossing, clamped onto the inner segment,
/// centres the sphere that is tested.
pub fn ray_capsule(
    ray: &Ray,
    bottom: Vec3,
    top: Vec3,
    radius: f32,
) -> Option<RayCollision> {
    let segment = top - bottom;
    let segment_length = segment.magnitude();
    let Some(axis) = utils::try_normalize(segment) else {
        return ray_sphere(ray, bottom, radius);
    };

    let across = ray.direction - axis * ray.direction.dot(&axis);
    let Some(plane) = Plane::from_point_normal(bottom, across) else {
        // Ray runs along the axis: the nearer cap is the only candidate
        let cap = if (bottom - ray.origin).magnitude_squared() <= (top - ray.origin).magnitude_squared() {
            bottom
        } else {
            top
        };
        return ray_sphere(ray, cap, radius);
    };

    let crossing = ray_plane(ray, &plane)?;
    let along = (crossing.point - bottom).dot(&axis).clamp(0.0, segment_length);
    ray_sphere(ray, bottom + axis * along, radius)
}

/// Ray against any collision volume placed at `transform`
pub fn ray_intersect(ray: &Ray, shape: &CollisionShape, transform: &Transform) -> Option<RayCollision> {
    if !ray.is_valid() {
        return None;
    }

    match *shape {
        CollisionShape::Sphere { radius } => ray_sphere(ray, transform.position, radius),
        CollisionShape::AxisAlignedBox { half_extents } => {
            ray_box(ray, transform.position, half_extents)
        }
        CollisionShape::OrientedBox { half_extents } => ray_obb(ray, transform, half_extents),
        CollisionShape::Capsule { radius, .. } => {
            let (bottom, top) = shape.capsule_segment(transform)?;
            ray_capsule(ray, bottom, top, radius)
        }
    }
}
