//! Rigid-body dynamics state and integration
//!
//! Integration is semi-implicit Euler in two phases: velocities from the
//! accumulated force and torque, then positions from the new velocities.
//! An inverse mass of zero marks an immovable body and turns every mutating
//! call into a no-op.

use crate::foundation::math::{Mat3, Quat, Quaternion, Transform, Vec3};

/// Default restitution for new bodies
pub const DEFAULT_ELASTICITY: f32 = 0.812;

/// How contacts involving a body are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionResponse {
    /// Velocity impulse plus positional correction
    #[default]
    Impulse,
    /// Penetration-proportional force, no positional correction
    Spring,
}

/// Per-body dynamics state
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    /// Linear velocity in world units per second
    pub linear_velocity: Vec3,
    /// Angular velocity in radians per second (world axes)
    pub angular_velocity: Vec3,
    /// Force accumulated since the last `clear_forces`
    pub force: Vec3,
    /// Torque accumulated since the last `clear_forces`
    pub torque: Vec3,
    /// Restitution used by impulse resolution
    pub elasticity: f32,
    /// Friction coefficient, carried for collaborators
    pub friction: f32,
    /// Contact response mode
    pub response: CollisionResponse,

    inverse_mass: f32,
    inverse_inertia: Vec3,
    inverse_inertia_tensor: Mat3,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RigidBody {
    /// Body with the given inverse mass and no inertia yet
    pub fn new(inverse_mass: f32) -> Self {
        Self {
            linear_velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            force: Vec3::zeros(),
            torque: Vec3::zeros(),
            elasticity: DEFAULT_ELASTICITY,
            friction: 0.0,
            response: CollisionResponse::Impulse,
            inverse_mass: inverse_mass.max(0.0),
            inverse_inertia: Vec3::zeros(),
            inverse_inertia_tensor: Mat3::zeros(),
        }
    }

    /// Immovable body
    pub fn fixed() -> Self {
        Self::new(0.0)
    }

    /// Inverse mass, zero for immovable bodies
    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    /// Change the inverse mass. Call an inertia initialiser afterwards.
    pub fn set_inverse_mass(&mut self, inverse_mass: f32) {
        self.inverse_mass = inverse_mass.max(0.0);
    }

    /// Mass, zero for immovable bodies
    pub fn mass(&self) -> f32 {
        if self.inverse_mass > 0.0 {
            1.0 / self.inverse_mass
        } else {
            0.0
        }
    }

    /// True when the body never moves
    pub fn is_static(&self) -> bool {
        self.inverse_mass == 0.0
    }

    /// World-space inverse inertia tensor
    pub fn inverse_inertia_tensor(&self) -> &Mat3 {
        &self.inverse_inertia_tensor
    }

    /// Reset accumulated force and torque
    pub fn clear_forces(&mut self) {
        self.force = Vec3::zeros();
        self.torque = Vec3::zeros();
    }

    /// Accumulate a force through the centre of mass
    pub fn add_force(&mut self, force: Vec3) {
        if self.is_static() {
            return;
        }
        self.force += force;
    }

    /// Accumulate a force applied at a world position, adding the torque of its lever arm
    pub fn add_force_at_position(&mut self, force: Vec3, world_position: Vec3, transform: &Transform) {
        if self.is_static() {
            return;
        }
        let lever = world_position - transform.position;
        self.force += force;
        self.torque += lever.cross(&force);
    }

    /// Accumulate a torque
    pub fn add_torque(&mut self, torque: Vec3) {
        if self.is_static() {
            return;
        }
        self.torque += torque;
    }

    /// Instant change of linear velocity
    pub fn apply_linear_impulse(&mut self, impulse: Vec3) {
        if self.is_static() {
            return;
        }
        self.linear_velocity += impulse * self.inverse_mass;
    }

    /// Instant change of angular velocity
    pub fn apply_angular_impulse(&mut self, impulse: Vec3) {
        if self.is_static() {
            return;
        }
        self.angular_velocity += self.inverse_inertia_tensor * impulse;
    }

    /// Box inertia, reading the transform scale as the full box size
    pub fn init_cube_inertia(&mut self, transform: &Transform) {
        let size_sq = transform.scale.component_mul(&transform.scale);
        let inverse = |a: f32, b: f32| {
            let sum = a + b;
            if sum > 0.0 {
                12.0 * self.inverse_mass / sum
            } else {
                0.0
            }
        };
        self.inverse_inertia = Vec3::new(
            inverse(size_sq.y, size_sq.z),
            inverse(size_sq.x, size_sq.z),
            inverse(size_sq.x, size_sq.y),
        );
        self.update_inertia_tensor(transform);
    }

    /// Solid sphere inertia, reading the largest scale component as the radius
    pub fn init_sphere_inertia(&mut self, transform: &Transform) {
        let radius = transform.scale.max();
        let element = if radius > 0.0 {
            2.5 * self.inverse_mass / (radius * radius)
        } else {
            0.0
        };
        self.inverse_inertia = Vec3::new(element, element, element);
        self.update_inertia_tensor(transform);
    }

    /// Rotate the local inverse inertia into world space
    pub fn update_inertia_tensor(&mut self, transform: &Transform) {
        let rotation = transform.rotation_matrix();
        self.inverse_inertia_tensor =
            rotation * Mat3::from_diagonal(&self.inverse_inertia) * rotation.transpose();
    }

    /// First integration phase: forces to velocities, then damping.
    /// Linear velocity loses `linear_damping` per second; angular velocity
    /// keeps `global_damping` of itself per second.
    pub fn integrate_velocity(&mut self, dt: f32, linear_damping: f32, global_damping: f32) {
        if self.is_static() {
            return;
        }

        self.linear_velocity += self.force * self.inverse_mass * dt;
        self.angular_velocity += self.inverse_inertia_tensor * self.torque * dt;

        self.linear_velocity *= (1.0 - linear_damping * dt).max(0.0);
        self.angular_velocity *= global_damping.clamp(0.0, 1.0).powf(dt);
    }

    /// Second integration phase: velocities to position and orientation
    pub fn integrate_position(&mut self, transform: &mut Transform, dt: f32) {
        if self.is_static() {
            return;
        }

        transform.position += self.linear_velocity * dt;

        let spin = self.angular_velocity * (dt * 0.5);
        let orientation = transform.rotation.into_inner();
        let delta = Quaternion::from_imag(spin) * orientation;
        transform.rotation = Quat::new_normalize(orientation + delta);

        self.update_inertia_tensor(transform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clear_forces_is_idempotent() {
        let mut body = RigidBody::new(1.0);
        body.add_force(Vec3::new(1.0, 2.0, 3.0));
        body.add_torque(Vec3::new(0.5, 0.0, 0.0));

        body.clear_forces();
        assert_eq!(body.force, Vec3::zeros());
        assert_eq!(body.torque, Vec3::zeros());
        body.clear_forces();
        assert_eq!(body.force, Vec3::zeros());
        assert_eq!(body.torque, Vec3::zeros());
    }

    #[test]
    fn test_static_body_ignores_everything() {
        let mut body = RigidBody::fixed();
        let mut transform = Transform::identity();
        body.add_force(Vec3::new(0.0, 100.0, 0.0));
        body.apply_linear_impulse(Vec3::new(5.0, 0.0, 0.0));
        body.apply_angular_impulse(Vec3::new(5.0, 0.0, 0.0));
        body.integrate_velocity(0.1, 0.4, 0.95);
        body.integrate_position(&mut transform, 0.1);

        assert_eq!(body.linear_velocity, Vec3::zeros());
        assert_eq!(body.angular_velocity, Vec3::zeros());
        assert_eq!(transform, Transform::identity());
    }

    #[test]
    fn test_force_at_position_adds_torque() {
        let mut body = RigidBody::new(1.0);
        let transform = Transform::identity();
        body.add_force_at_position(Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0), &transform);
        assert_relative_eq!(body.torque, Vec3::new(0.0, -1.0, 0.0));
        assert_relative_eq!(body.force, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_semi_implicit_integration_uses_new_velocity() {
        let mut body = RigidBody::new(0.5);
        let mut transform = Transform::identity();
        body.add_force(Vec3::new(4.0, 0.0, 0.0));
        body.integrate_velocity(0.5, 0.0, 1.0);
        body.integrate_position(&mut transform, 0.5);

        assert_relative_eq!(body.linear_velocity, Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(transform.position, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_orientation_stays_normalized() {
        let mut body = RigidBody::new(1.0);
        let mut transform = Transform::identity().with_scale(Vec3::new(2.0, 2.0, 2.0));
        body.init_cube_inertia(&transform);
        body.angular_velocity = Vec3::new(3.0, 1.0, -2.0);
        for _ in 0..100 {
            body.integrate_position(&mut transform, 1.0 / 60.0);
        }
        assert_relative_eq!(transform.rotation.quaternion().norm(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_inertia_formulas() {
        let transform = Transform::identity().with_scale(Vec3::new(2.0, 2.0, 2.0));
        let mut cube = RigidBody::new(2.0);
        cube.init_cube_inertia(&transform);
        assert_relative_eq!(cube.inverse_inertia_tensor()[(0, 0)], 12.0 * 2.0 / 8.0);

        let mut sphere = RigidBody::new(2.0);
        sphere.init_sphere_inertia(&transform);
        assert_relative_eq!(sphere.inverse_inertia_tensor()[(1, 1)], 2.5 * 2.0 / 4.0);
    }
}
