//! Shape-pair intersection tests producing contact geometry
//!
//! Every test takes body A first and body B second. The contact normal points
//! from B toward A: A separates along `+normal`, B along `-normal`. Local
//! contact points are offsets from each body's centre in world orientation.

use super::shape::CollisionShape;
use crate::foundation::math::{utils, Transform, Vec3};
use crate::physics::world::BodyHandle;

/// Below this length a sphere centre counts as sitting inside the box
const INSIDE_EPSILON: f32 = 1.0e-6;

/// One point of contact between two bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// Contact point on A, relative to A's centre
    pub local_a: Vec3,
    /// Contact point on B, relative to B's centre
    pub local_b: Vec3,
    /// Unit normal from B toward A
    pub normal: Vec3,
    /// Overlap depth, never negative
    pub penetration: f32,
    /// Impulse applied to this contact so far in the current frame
    pub accumulated_impulse: f32,
    /// Effective mass along the normal from the last resolution pass
    pub normal_mass: f32,
}

impl ContactPoint {
    /// Contact with an empty impulse cache
    pub fn new(local_a: Vec3, local_b: Vec3, normal: Vec3, penetration: f32) -> Self {
        Self {
            local_a,
            local_b,
            normal,
            penetration: penetration.max(0.0),
            accumulated_impulse: 0.0,
            normal_mass: 0.0,
        }
    }

    /// The same contact seen with A and B exchanged
    pub fn swapped(self) -> Self {
        Self {
            local_a: self.local_b,
            local_b: self.local_a,
            normal: -self.normal,
            ..self
        }
    }
}

/// Confirmed overlap between two bodies
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionInfo {
    /// First body, as ordered by the caller
    pub a: BodyHandle,
    /// Second body
    pub b: BodyHandle,
    /// Contact points, at least one
    pub contacts: Vec<ContactPoint>,
}

impl CollisionInfo {
    /// Single-contact collision
    pub fn new(a: BodyHandle, b: BodyHandle, contact: ContactPoint) -> Self {
        Self {
            a,
            b,
            contacts: vec![contact],
        }
    }

    /// True if `handle` is either side of this collision
    pub fn involves(&self, handle: BodyHandle) -> bool {
        self.a == handle || self.b == handle
    }

    /// Fold one resolution pass into this collision: impulses add up contact by
    /// contact and the latest effective mass is kept
    pub fn absorb_pass(&mut self, pass: &CollisionInfo) {
        for (kept, fresh) in self.contacts.iter_mut().zip(&pass.contacts) {
            kept.accumulated_impulse += fresh.accumulated_impulse;
            if fresh.normal_mass > 0.0 {
                kept.normal_mass = fresh.normal_mass;
            }
        }
    }
}

/// Dispatch on the pair of shapes. Unsupported pairs and separated shapes
/// return `None`.
pub fn intersect(
    shape_a: &CollisionShape,
    transform_a: &Transform,
    shape_b: &CollisionShape,
    transform_b: &Transform,
) -> Option<ContactPoint> {
    use CollisionShape::{AxisAlignedBox, Capsule, OrientedBox, Sphere};

    match (*shape_a, *shape_b) {
        (Sphere { radius: ra }, Sphere { radius: rb }) => {
            sphere_sphere(transform_a.position, ra, transform_b.position, rb)
        }
        (AxisAlignedBox { half_extents: ha }, AxisAlignedBox { half_extents: hb }) => {
            aabb_aabb(transform_a.position, ha, transform_b.position, hb)
        }
        (AxisAlignedBox { half_extents }, Sphere { radius }) => {
            aabb_sphere(transform_a.position, half_extents, transform_b.position, radius)
        }
        (OrientedBox { half_extents }, Sphere { radius }) => {
            obb_sphere(transform_a, half_extents, transform_b.position, radius)
        }
        (AxisAlignedBox { half_extents }, Capsule { radius, .. }) => {
            let (bottom, top) = shape_b.capsule_segment(transform_b)?;
            aabb_capsule(transform_a.position, half_extents, transform_b.position, bottom, top, radius)
        }
        (Sphere { radius: sphere_radius }, Capsule { radius, .. }) => {
            let (bottom, top) = shape_b.capsule_segment(transform_b)?;
            sphere_capsule(transform_a.position, sphere_radius, transform_b.position, bottom, top, radius)
        }
        (Sphere { .. }, AxisAlignedBox { .. } | OrientedBox { .. })
        | (Capsule { .. }, AxisAlignedBox { .. } | Sphere { .. }) => {
            intersect(shape_b, transform_b, shape_a, transform_a).map(ContactPoint::swapped)
        }
        _ => None,
    }
}

/// Two world-aligned boxes. The normal is the face direction of least
/// penetration.
pub fn aabb_aabb(position_a: Vec3, half_a: Vec3, position_b: Vec3, half_b: Vec3) -> Option<ContactPoint> {
    let delta = position_b - position_a;
    let total = half_a + half_b;
    if (0..3).any(|axis| delta[axis].abs() >= total[axis]) {
        return None;
    }

    let max_a = position_a + half_a;
    let min_a = position_a - half_a;
    let max_b = position_b + half_b;
    let min_b = position_b - half_b;

    // B pressing on A's -x face pushes A toward +x, and so on
    let faces = [
        (Vec3::x(), max_b.x - min_a.x),
        (-Vec3::x(), max_a.x - min_b.x),
        (Vec3::y(), max_b.y - min_a.y),
        (-Vec3::y(), max_a.y - min_b.y),
        (Vec3::z(), max_b.z - min_a.z),
        (-Vec3::z(), max_a.z - min_b.z),
    ];

    let (normal, penetration) = faces
        .into_iter()
        .fold((Vec3::x(), f32::MAX), |best, face| if face.1 < best.1 { face } else { best });

    Some(ContactPoint::new(Vec3::zeros(), Vec3::zeros(), normal, penetration))
}

/// Two spheres. Coincident centres separate along +Y.
pub fn sphere_sphere(position_a: Vec3, radius_a: f32, position_b: Vec3, radius_b: f32) -> Option<ContactPoint> {
    let radii = radius_a + radius_b;
    let delta = position_a - position_b;
    let distance = delta.magnitude();
    if distance >= radii {
        return None;
    }

    let normal = utils::try_normalize(delta).unwrap_or_else(Vec3::y);
    Some(ContactPoint::new(
        -normal * radius_a,
        normal * radius_b,
        normal,
        radii - distance,
    ))
}

/// World-aligned box (A) against sphere (B)
pub fn aabb_sphere(box_position: Vec3, half_extents: Vec3, sphere_position: Vec3, radius: f32) -> Option<ContactPoint> {
    let delta = sphere_position - box_position;
    let closest = utils::clamp_vec(delta, -half_extents, half_extents);
    let outward = delta - closest;
    let distance = outward.magnitude();

    if distance >= radius {
        return None;
    }

    if distance > INSIDE_EPSILON {
        // Sphere centre outside the box: push the sphere along box -> centre
        let normal = -outward / distance;
        return Some(ContactPoint::new(closest, normal * radius, normal, radius - distance));
    }

    // Centre inside the box: leave through the nearest face
    let mut best = (0, 1.0_f32, f32::MAX);
    for axis in 0..3 {
        let to_positive = half_extents[axis] - delta[axis];
        let to_negative = half_extents[axis] + delta[axis];
        if to_positive < best.2 {
            best = (axis, 1.0, to_positive);
        }
        if to_negative < best.2 {
            best = (axis, -1.0, to_negative);
        }
    }
    let (axis, sign, depth) = best;

    let mut face_direction = Vec3::zeros();
    face_direction[axis] = sign;
    let mut surface = delta;
    surface[axis] = sign * half_extents[axis];

    let normal = -face_direction;
    Some(ContactPoint::new(surface, normal * radius, normal, depth + radius))
}

/// Oriented box (A) against sphere (B), solved in the box's frame
pub fn obb_sphere(box_transform: &Transform, half_extents: Vec3, sphere_position: Vec3, radius: f32) -> Option<ContactPoint> {
    let local_sphere = box_transform.to_local(sphere_position);
    let local = aabb_sphere(Vec3::zeros(), half_extents, local_sphere, radius)?;
    let rotation = box_transform.rotation;

    Some(ContactPoint::new(
        rotation * local.local_a,
        rotation * local.local_b,
        rotation * local.normal,
        local.penetration,
    ))
}

/// Sphere (A) against capsule (B)
pub fn sphere_capsule(
    sphere_position: Vec3,
    sphere_radius: f32,
    capsule_position: Vec3,
    bottom: Vec3,
    top: Vec3,
    capsule_radius: f32,
) -> Option<ContactPoint> {
    let on_axis = closest_point_on_segment(sphere_position, bottom, top);
    let mut contact = sphere_sphere(sphere_position, sphere_radius, on_axis, capsule_radius)?;
    contact.local_b += on_axis - capsule_position;
    Some(contact)
}

/// World-aligned box (A) against capsule (B)
pub fn aabb_capsule(
    box_position: Vec3,
    half_extents: Vec3,
    capsule_position: Vec3,
    bottom: Vec3,
    top: Vec3,
    capsule_radius: f32,
) -> Option<ContactPoint> {
    let on_axis = closest_point_on_segment(box_position, bottom, top);
    let mut contact = aabb_sphere(box_position, half_extents, on_axis, capsule_radius)?;
    contact.local_b += on_axis - capsule_position;
    Some(contact)
}

/// Project `point` onto the segment, clamped to its end points
pub fn closest_point_on_segment(point: Vec3, start: Vec3, end: Vec3) -> Vec3 {
    let segment = end - start;
    let length_sq = segment.magnitude_squared();
    if length_sq <= f32::EPSILON {
        return start;
    }
    let t = ((point - start).dot(&segment) / length_sq).clamp(0.0, 1.0);
    start + segment * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::utils::quat_from_euler_degrees;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_sphere_penetration_and_normal() {
        let contact = sphere_sphere(Vec3::new(3.0, 0.0, 0.0), 2.0, Vec3::zeros(), 2.0).unwrap();
        assert_relative_eq!(contact.penetration, 1.0);
        assert_relative_eq!(contact.normal, Vec3::x());
        assert_relative_eq!(contact.local_a, Vec3::new(-2.0, 0.0, 0.0));
        assert_relative_eq!(contact.local_b, Vec3::new(2.0, 0.0, 0.0));

        // Touching exactly is not overlapping
        assert!(sphere_sphere(Vec3::new(4.0, 0.0, 0.0), 2.0, Vec3::zeros(), 2.0).is_none());
    }

    #[test]
    fn test_sphere_sphere_coincident_centres_stay_finite() {
        let contact = sphere_sphere(Vec3::zeros(), 1.0, Vec3::zeros(), 1.0).unwrap();
        assert_relative_eq!(contact.normal.magnitude(), 1.0);
        assert_relative_eq!(contact.penetration, 2.0);
    }

    #[test]
    fn test_aabb_aabb_symmetric_and_shallowest_axis() {
        let half = Vec3::new(1.0, 1.0, 1.0);
        let a = Vec3::zeros();
        let b = Vec3::new(1.5, 0.2, 0.0);

        let ab = aabb_aabb(a, half, b, half).unwrap();
        let ba = aabb_aabb(b, half, a, half).unwrap();
        assert_relative_eq!(ab.penetration, 0.5);
        assert_relative_eq!(ab.normal, -Vec3::x());
        assert_relative_eq!(ba.penetration, 0.5);
        assert_relative_eq!(ba.normal, Vec3::x());

        let far = Vec3::new(2.0, 0.0, 0.0);
        assert!(aabb_aabb(a, half, far, half).is_none());
        assert!(aabb_aabb(far, half, a, half).is_none());
    }

    #[test]
    fn test_aabb_sphere_outside_face() {
        let contact = aabb_sphere(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.0, 1.5, 0.0), 1.0).unwrap();
        assert_relative_eq!(contact.penetration, 0.5);
        // Sphere is B, sitting above: normal from B down to the box
        assert_relative_eq!(contact.normal, -Vec3::y());
        assert_relative_eq!(contact.local_a, Vec3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(contact.local_b, Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_aabb_sphere_centre_inside_box() {
        let contact = aabb_sphere(Vec3::zeros(), Vec3::new(2.0, 1.0, 2.0), Vec3::new(0.5, 0.8, 0.0), 0.5).unwrap();
        assert_relative_eq!(contact.normal, -Vec3::y());
        assert_relative_eq!(contact.penetration, 0.2 + 0.5, epsilon = 1e-6);
        assert!(contact.normal.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_swapped_dispatch_flips_normal() {
        let sphere = CollisionShape::sphere(1.0);
        let floor = CollisionShape::aabb(Vec3::new(10.0, 1.0, 10.0));
        let sphere_at = Transform::from_position(Vec3::new(0.0, 1.5, 0.0));
        let floor_at = Transform::identity();

        let box_first = intersect(&floor, &floor_at, &sphere, &sphere_at).unwrap();
        let sphere_first = intersect(&sphere, &sphere_at, &floor, &floor_at).unwrap();
        assert_relative_eq!(sphere_first.normal, Vec3::y());
        assert_relative_eq!(sphere_first.normal, -box_first.normal);
        assert_relative_eq!(sphere_first.local_a, box_first.local_b);
        assert_relative_eq!(sphere_first.penetration, box_first.penetration);
    }

    #[test]
    fn test_obb_sphere_rotates_back() {
        let box_at = Transform::identity().with_rotation(quat_from_euler_degrees(Vec3::new(0.0, 0.0, 45.0)));
        let sphere_position = Vec3::new(1.2, 1.2, 0.0);
        let contact = obb_sphere(&box_at, Vec3::new(1.0, 1.0, 1.0), sphere_position, 1.0).unwrap();

        let expected = -Vec3::new(1.0, 1.0, 0.0).normalize();
        assert_relative_eq!(contact.normal, expected, epsilon = 1e-5);
        assert_relative_eq!(contact.penetration, 1.0 - (1.2 * 2.0_f32.sqrt() - 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_capsule_reductions() {
        let capsule = CollisionShape::capsule(3.0, 1.0);
        let capsule_at = Transform::from_position(Vec3::new(0.0, 3.0, 0.0));

        let sphere = CollisionShape::sphere(1.0);
        let sphere_at = Transform::from_position(Vec3::new(1.5, 4.0, 0.0));
        let contact = intersect(&sphere, &sphere_at, &capsule, &capsule_at).unwrap();
        assert_relative_eq!(contact.normal, Vec3::x(), epsilon = 1e-6);
        assert_relative_eq!(contact.penetration, 0.5, epsilon = 1e-6);
        assert_relative_eq!(contact.local_b, Vec3::new(1.0, 1.0, 0.0), epsilon = 1e-6);

        let floor = CollisionShape::aabb(Vec3::new(5.0, 0.5, 5.0));
        let floor_at = Transform::from_position(Vec3::new(0.0, -0.25, 0.0));
        let contact = intersect(&capsule, &capsule_at, &floor, &floor_at).unwrap();
        assert_relative_eq!(contact.normal, Vec3::y(), epsilon = 1e-6);
        assert_relative_eq!(contact.penetration, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_unsupported_pairs_report_nothing() {
        let obb = CollisionShape::obb(Vec3::new(1.0, 1.0, 1.0));
        let capsule = CollisionShape::capsule(2.0, 1.0);
        let at = Transform::identity();
        assert!(intersect(&obb, &at, &obb, &at).is_none());
        assert!(intersect(&obb, &at, &capsule, &at).is_none());
        assert!(intersect(&capsule, &at, &capsule, &at).is_none());
    }
}
