//! One simulated entity: placement, volume, dynamics and gameplay hook

use std::fmt;

use crate::foundation::math::{utils, Transform, Vec3};
use crate::physics::body::{CollisionResponse, RigidBody};
use crate::physics::collision::CollisionShape;
use crate::physics::collision_layers::CollisionLayers;
use crate::physics::events::CollisionHandler;
use crate::spatial::AABB;

/// A simulated object owned by the world
pub struct PhysicsObject {
    /// Name used in logs and by gameplay handlers
    pub name: String,
    /// World placement
    pub transform: Transform,
    /// Collision volume; objects without one never collide or get hit by rays
    pub shape: Option<CollisionShape>,
    /// Dynamics state
    pub body: RigidBody,
    /// Layers this object is on
    pub layer: CollisionLayers,
    /// Layers this object accepts contacts from
    pub mask: CollisionLayers,
    /// Inactive objects stay in the world but are not simulated
    pub active: bool,
    handler: Option<Box<dyn CollisionHandler>>,
}

impl fmt::Debug for PhysicsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsObject")
            .field("name", &self.name)
            .field("transform", &self.transform)
            .field("shape", &self.shape)
            .field("body", &self.body)
            .field("layer", &self.layer)
            .field("mask", &self.mask)
            .field("active", &self.active)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl PhysicsObject {
    /// Object with the given parts, on the default layer and accepting everything
    pub fn new(name: impl Into<String>, transform: Transform, shape: Option<CollisionShape>, body: RigidBody) -> Self {
        Self {
            name: name.into(),
            transform,
            shape,
            body,
            layer: CollisionLayers::DEFAULT,
            mask: CollisionLayers::all(),
            active: true,
            handler: None,
        }
    }

    /// Sphere whose scale is its radius
    pub fn sphere(position: Vec3, radius: f32, inverse_mass: f32) -> Self {
        let transform = Transform::from_position(position).with_scale(Vec3::new(radius, radius, radius));
        let mut body = RigidBody::new(inverse_mass);
        body.friction = 0.4;
        body.init_sphere_inertia(&transform);
        Self::new("Sphere", transform, Some(CollisionShape::sphere(radius)), body)
    }

    /// World-aligned box; the scale is the full size
    pub fn cube(position: Vec3, half_extents: Vec3, inverse_mass: f32) -> Self {
        let transform = Transform::from_position(position).with_scale(half_extents * 2.0);
        let mut body = RigidBody::new(inverse_mass);
        body.init_cube_inertia(&transform);
        Self::new("Cube", transform, Some(CollisionShape::aabb(half_extents)), body)
    }

    /// Immovable world-aligned floor
    pub fn floor_aabb(position: Vec3, half_extents: Vec3) -> Self {
        let mut floor = Self::cube(position, half_extents, 0.0);
        floor.name = "AABB Floor".to_string();
        floor.layer = CollisionLayers::ENVIRONMENT;
        floor
    }

    /// Immovable oriented floor, rotated by per-axis degrees
    pub fn floor_obb(position: Vec3, rotation_degrees: Vec3, half_extents: Vec3) -> Self {
        let transform = Transform::from_position(position)
            .with_rotation(utils::quat_from_euler_degrees(rotation_degrees))
            .with_scale(half_extents * 2.0);
        let mut body = RigidBody::fixed();
        body.init_cube_inertia(&transform);

        let mut floor = Self::new("OBB Floor", transform, Some(CollisionShape::obb(half_extents)), body);
        floor.layer = CollisionLayers::ENVIRONMENT;
        floor
    }

    /// Upright capsule
    pub fn capsule(position: Vec3, half_height: f32, radius: f32, inverse_mass: f32) -> Self {
        let transform = Transform::from_position(position)
            .with_scale(Vec3::new(radius * 2.0, half_height, radius * 2.0));
        let mut body = RigidBody::new(inverse_mass);
        body.init_cube_inertia(&transform);
        Self::new("Capsule", transform, Some(CollisionShape::capsule(half_height, radius)), body)
    }

    /// Builder: rename
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder: layer and mask
    pub fn with_layers(mut self, layer: CollisionLayers, mask: CollisionLayers) -> Self {
        self.layer = layer;
        self.mask = mask;
        self
    }

    /// Builder: contact response mode
    pub fn with_response(mut self, response: CollisionResponse) -> Self {
        self.body.response = response;
        self
    }

    /// Builder: restitution and friction
    pub fn with_surface(mut self, elasticity: f32, friction: f32) -> Self {
        self.body.elasticity = elasticity;
        self.body.friction = friction;
        self
    }

    /// Builder: attach a gameplay hook
    pub fn with_handler(mut self, handler: impl CollisionHandler + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Replace the gameplay hook
    pub fn set_handler(&mut self, handler: Option<Box<dyn CollisionHandler>>) {
        self.handler = handler;
    }

    pub(crate) fn take_handler(&mut self) -> Option<Box<dyn CollisionHandler>> {
        self.handler.take()
    }

    pub(crate) fn restore_handler(&mut self, handler: Option<Box<dyn CollisionHandler>>) {
        if self.handler.is_none() {
            self.handler = handler;
        }
    }

    /// World bounds of the collision volume, if any
    pub fn world_aabb(&self) -> Option<AABB> {
        self.shape.as_ref().map(|shape| shape.world_aabb(&self.transform))
    }

    /// Whether `self` and `other` accept each other's layers
    pub fn accepts(&self, other: &PhysicsObject) -> bool {
        CollisionLayers::should_collide(self.layer, self.mask, other.layer, other.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_builders_set_scale_like_level_code() {
        let sphere = PhysicsObject::sphere(Vec3::zeros(), 4.0, 2.0);
        assert_relative_eq!(sphere.transform.scale, Vec3::new(4.0, 4.0, 4.0));
        assert_relative_eq!(sphere.body.friction, 0.4);

        let cube = PhysicsObject::cube(Vec3::zeros(), Vec3::new(5.0, 5.0, 5.0), 5.0);
        assert_relative_eq!(cube.transform.scale, Vec3::new(10.0, 10.0, 10.0));

        let floor = PhysicsObject::floor_aabb(Vec3::zeros(), Vec3::new(100.0, 2.0, 100.0));
        assert!(floor.body.is_static());
        assert_eq!(floor.layer, CollisionLayers::ENVIRONMENT);
    }

    #[test]
    fn test_world_aabb_follows_transform() {
        let mut cube = PhysicsObject::cube(Vec3::zeros(), Vec3::new(1.0, 2.0, 3.0), 1.0);
        cube.transform.position = Vec3::new(10.0, 0.0, 0.0);
        let bounds = cube.world_aabb().unwrap();
        assert_relative_eq!(bounds.min, Vec3::new(9.0, -2.0, -3.0));

        let bare = PhysicsObject::new("marker", Transform::identity(), None, RigidBody::fixed());
        assert!(bare.world_aabb().is_none());
    }
}
