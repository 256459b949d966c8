//! Rod between two bodies

use std::any::Any;

use super::{Constraint, InputSignal, DEFAULT_BIAS_FACTOR};
use crate::foundation::math::utils;
use crate::physics::world::{BodyHandle, ObjectArena};

/// Keeps two bodies `distance` apart
#[derive(Debug, Clone, PartialEq)]
pub struct PositionConstraint {
    bodies: [BodyHandle; 2],
    /// Rest distance between the two centres
    pub distance: f32,
    /// Fraction of the error corrected per second of `dt`
    pub bias_factor: f32,
}

impl PositionConstraint {
    /// Rod of length `distance` between `a` and `b`
    pub fn new(a: BodyHandle, b: BodyHandle, distance: f32) -> Self {
        Self {
            bodies: [a, b],
            distance,
            bias_factor: DEFAULT_BIAS_FACTOR,
        }
    }
}

impl Constraint for PositionConstraint {
    fn update_constraint(&mut self, objects: &mut ObjectArena, _input: &InputSignal, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let Some([a, b]) = objects.get_disjoint_mut(self.bodies) else {
            return;
        };

        let relative_position = a.transform.position - b.transform.position;
        let current_distance = relative_position.magnitude();
        let offset = self.distance - current_distance;
        if offset == 0.0 {
            return;
        }
        let Some(direction) = utils::try_normalize(relative_position) else {
            return;
        };

        let constraint_mass = a.body.inverse_mass() + b.body.inverse_mass();
        if constraint_mass <= 0.0 {
            return;
        }

        let relative_velocity = a.body.linear_velocity - b.body.linear_velocity;
        let velocity_dot = relative_velocity.dot(&direction);
        let bias = -(self.bias_factor / dt) * offset;
        let lambda = -(velocity_dot + bias) / constraint_mass;

        a.body.apply_linear_impulse(direction * lambda);
        b.body.apply_linear_impulse(-direction * lambda);
    }

    fn bodies(&self) -> &[BodyHandle] {
        &self.bodies
    }

    fn name(&self) -> &'static str {
        "PositionConstraint"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::physics::body::RigidBody;
    use crate::physics::object::PhysicsObject;
    use crate::foundation::math::Transform;
    use approx::assert_relative_eq;

    fn arena_with(a: Vec3, inverse_a: f32, b: Vec3, inverse_b: f32) -> (ObjectArena, BodyHandle, BodyHandle) {
        let mut arena = ObjectArena::with_key();
        let ha = arena.insert(PhysicsObject::new("a", Transform::from_position(a), None, RigidBody::new(inverse_a)));
        let hb = arena.insert(PhysicsObject::new("b", Transform::from_position(b), None, RigidBody::new(inverse_b)));
        (arena, ha, hb)
    }

    fn step(arena: &mut ObjectArena, dt: f32) {
        for object in arena.values_mut() {
            let PhysicsObject { body, transform, .. } = object;
            body.integrate_position(transform, dt);
        }
    }

    #[test]
    fn test_stretched_rod_converges_to_rest_distance() {
        let (mut arena, a, b) = arena_with(Vec3::zeros(), 1.0, Vec3::new(20.0, 0.0, 0.0), 1.0);
        let mut rod = PositionConstraint::new(a, b, 10.0);
        let dt = 1.0 / 60.0;

        let mut previous_error = 10.0_f32;
        for frame in 0..1500 {
            rod.update_constraint(&mut arena, &InputSignal::default(), dt);
            step(&mut arena, dt);

            let error = ((arena[a].transform.position - arena[b].transform.position).magnitude() - 10.0).abs();
            assert!(error <= previous_error + 1e-4, "diverged at frame {frame}");
            previous_error = error;
        }
        assert!(previous_error < 0.01);
    }

    #[test]
    fn test_equal_masses_receive_opposite_impulses() {
        let (mut arena, a, b) = arena_with(Vec3::zeros(), 2.0, Vec3::new(0.0, 12.0, 0.0), 2.0);
        let mut rod = PositionConstraint::new(a, b, 10.0);
        rod.update_constraint(&mut arena, &InputSignal::default(), 0.1);

        let va = arena[a].body.linear_velocity;
        let vb = arena[b].body.linear_velocity;
        assert_relative_eq!(va, -vb);
        // Stretched: A moves toward B
        assert!(va.y > 0.0);
    }

    #[test]
    fn test_two_static_bodies_are_left_alone() {
        let (mut arena, a, b) = arena_with(Vec3::zeros(), 0.0, Vec3::new(5.0, 0.0, 0.0), 0.0);
        let mut rod = PositionConstraint::new(a, b, 10.0);
        rod.update_constraint(&mut arena, &InputSignal::default(), 0.1);
        assert_eq!(arena[a].body.linear_velocity, Vec3::zeros());
    }

    #[test]
    fn test_coincident_bodies_do_not_produce_nan() {
        let (mut arena, a, b) = arena_with(Vec3::zeros(), 1.0, Vec3::zeros(), 1.0);
        let mut rod = PositionConstraint::new(a, b, 10.0);
        rod.update_constraint(&mut arena, &InputSignal::default(), 0.1);
        assert!(arena[a].body.linear_velocity.iter().all(|c| c.is_finite()));
    }
}
