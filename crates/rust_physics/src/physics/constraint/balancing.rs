//! Self-levelling platform that can be tilted by steering input

use std::any::Any;

use super::{Constraint, InputSignal, DEFAULT_BIAS_FACTOR};
use crate::foundation::math::{utils, Vec3};
use crate::physics::world::{BodyHandle, ObjectArena};

/// Holds a platform at its resting point and eases it back to `resting_up`.
/// Steering is applied as an angular impulse on top, once per update.
#[derive(Debug, Clone, PartialEq)]
pub struct BalancingPlaneConstraint {
    body: [BodyHandle; 1],
    /// Point the platform is held at
    pub resting_position: Vec3,
    /// Unit up direction the platform levels toward
    pub resting_up: Vec3,
    /// Fraction of the position and tilt error corrected per second of `dt`
    pub bias_factor: f32,
}

impl BalancingPlaneConstraint {
    /// Platform held at `resting_position`, levelling toward `resting_up`.
    /// A zero up vector falls back to +Y.
    pub fn new(body: BodyHandle, resting_position: Vec3, resting_up: Vec3) -> Self {
        Self {
            body: [body],
            resting_position,
            resting_up: utils::try_normalize(resting_up).unwrap_or_else(Vec3::y),
            bias_factor: DEFAULT_BIAS_FACTOR,
        }
    }
}

impl Constraint for BalancingPlaneConstraint {
    fn update_constraint(&mut self, objects: &mut ObjectArena, input: &InputSignal, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let Some(object) = objects.get_mut(self.body[0]) else {
            return;
        };
        let inverse_mass = object.body.inverse_mass();
        if inverse_mass <= 0.0 {
            return;
        }

        // Linear: pull back toward the resting point
        let relative_position = object.transform.position - self.resting_position;
        if let Some(direction) = utils::try_normalize(relative_position) {
            let offset = -relative_position.magnitude();
            let velocity_dot = object.body.linear_velocity.dot(&direction);
            let bias = -(self.bias_factor / dt) * offset;
            let lambda = -(velocity_dot + bias) / inverse_mass;
            object.body.apply_linear_impulse(direction * lambda);
        }

        // Angular: rotate the current up toward the resting up
        let current_up = object.transform.up();
        let correction_axis = current_up.cross(&self.resting_up);
        let sin_angle = correction_axis.magnitude();
        if let Some(axis) = utils::try_normalize(correction_axis) {
            let angle = sin_angle.atan2(current_up.dot(&self.resting_up));
            let effective = axis.dot(&(object.body.inverse_inertia_tensor() * axis));
            if effective > 0.0 {
                let angular_dot = object.body.angular_velocity.dot(&axis);
                let target = (self.bias_factor / dt) * angle;
                let lambda = (target - angular_dot) / effective;
                object.body.apply_angular_impulse(axis * lambda);
            }
        }

        object.body.apply_angular_impulse(input.steering);
    }

    fn bodies(&self) -> &[BodyHandle] {
        &self.body
    }

    fn name(&self) -> &'static str {
        "BalancingPlaneConstraint"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
