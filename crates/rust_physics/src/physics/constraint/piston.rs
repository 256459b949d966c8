//! Platform that travels out along an axis and back to its resting point

use std::any::Any;

use super::{velocity_correction, Constraint, InputSignal, DEFAULT_BIAS_FACTOR};
use crate::foundation::math::{utils, Vec3};
use crate::physics::world::{BodyHandle, ObjectArena};

/// Default travel from the resting point
pub const DEFAULT_MAX_EXTENSION: f32 = 30.0;

/// Default travel speed in units per second
pub const DEFAULT_PISTON_SPEED: f32 = 20.0;

/// Where a piston is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PistonState {
    /// Held at the resting point until triggered
    #[default]
    Resting,
    /// Travelling out along the axis toward full extension
    Contracting,
    /// Travelling back to the resting point
    Retracting,
}

/// One-body prismatic joint with a trigger-driven cycle
#[derive(Debug, Clone, PartialEq)]
pub struct PistonConstraint {
    body: [BodyHandle; 1],
    /// Point the platform rests at
    pub resting_position: Vec3,
    /// Unit direction of travel
    pub axis: Vec3,
    /// Distance travelled before turning back
    pub max_extension: f32,
    /// Travel speed
    pub speed: f32,
    /// Fraction of the resting error corrected per second of `dt`
    pub bias_factor: f32,
    state: PistonState,
}

impl PistonConstraint {
    /// Piston resting at `resting_position` that travels along `axis`.
    /// A zero axis falls back to +Y.
    pub fn new(body: BodyHandle, resting_position: Vec3, axis: Vec3) -> Self {
        Self {
            body: [body],
            resting_position,
            axis: utils::try_normalize(axis).unwrap_or_else(Vec3::y),
            max_extension: DEFAULT_MAX_EXTENSION,
            speed: DEFAULT_PISTON_SPEED,
            bias_factor: DEFAULT_BIAS_FACTOR,
            state: PistonState::Resting,
        }
    }

    /// Builder: travel distance
    pub fn with_max_extension(mut self, max_extension: f32) -> Self {
        self.max_extension = max_extension.max(0.0);
        self
    }

    /// Builder: travel speed
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed.abs();
        self
    }

    /// Current cycle state
    pub fn state(&self) -> PistonState {
        self.state
    }

    fn transition(&mut self, next: PistonState) {
        if self.state != next {
            log::debug!("Piston {:?}: {:?} -> {:?}", self.body[0], self.state, next);
            self.state = next;
        }
    }
}

impl Constraint for PistonConstraint {
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

        let displacement = (object.transform.position - self.resting_position).dot(&self.axis);

        if self.state == PistonState::Resting && input.trigger {
            self.transition(PistonState::Contracting);
        }
        if self.state == PistonState::Contracting && displacement >= self.max_extension {
            self.transition(PistonState::Retracting);
        }
        if self.state == PistonState::Retracting && displacement <= 0.0 {
            self.transition(PistonState::Resting);
        }

        // Stay on the axis line, inside the travel range
        let along = displacement.clamp(0.0, self.max_extension);
        object.transform.position = self.resting_position + self.axis * along;

        let velocity = object.body.linear_velocity;
        let off_axis = velocity - self.axis * velocity.dot(&self.axis);
        object.body.apply_linear_impulse(-off_axis / inverse_mass);
        object.body.angular_velocity = Vec3::zeros();

        let target = match self.state {
            PistonState::Resting => -(self.bias_factor / dt) * along,
            PistonState::Contracting => self.speed,
            PistonState::Retracting => -self.speed,
        };
        let velocity = object.body.linear_velocity;
        object
            .body
            .apply_linear_impulse(velocity_correction(velocity, self.axis, target, inverse_mass));
    }

    fn bodies(&self) -> &[BodyHandle] {
        &self.body
    }

    fn name(&self) -> &'static str {
        "PistonConstraint"
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
    use crate::foundation::math::Transform;
    use crate::physics::body::RigidBody;
    use crate::physics::object::PhysicsObject;
    use approx::assert_relative_eq;

    fn setup() -> (ObjectArena, BodyHandle, PistonConstraint) {
        let mut arena = ObjectArena::with_key();
        let rest = Vec3::new(0.0, 5.0, 0.0);
        let handle = arena.insert(PhysicsObject::new(
            "piston",
            Transform::from_position(rest),
            None,
            RigidBody::new(0.25),
        ));
        let piston = PistonConstraint::new(handle, rest, Vec3::new(-1.0, 0.0, 0.0)).with_max_extension(3.0);
        (arena, handle, piston)
    }

    fn advance(arena: &mut ObjectArena, dt: f32) {
        for object in arena.values_mut() {
            let PhysicsObject { body, transform, .. } = object;
            body.integrate_position(transform, dt);
        }
    }

    #[test]
    fn test_full_cycle() {
        let (mut arena, handle, mut piston) = setup();
        let dt = 1.0 / 60.0;

        piston.update_constraint(&mut arena, &InputSignal::default(), dt);
        assert_eq!(piston.state(), PistonState::Resting);

        let fire = InputSignal { trigger: true, ..Default::default() };
        piston.update_constraint(&mut arena, &fire, dt);
        assert_eq!(piston.state(), PistonState::Contracting);

        let mut furthest = 0.0_f32;
        let mut saw_retract = false;
        for _ in 0..600 {
            advance(&mut arena, dt);
            piston.update_constraint(&mut arena, &InputSignal::default(), dt);
            furthest = furthest.max(-(arena[handle].transform.position.x));
            saw_retract |= piston.state() == PistonState::Retracting;
            if saw_retract && piston.state() == PistonState::Resting {
                break;
            }
        }

        assert!(saw_retract);
        assert_eq!(piston.state(), PistonState::Resting);
        assert!(furthest <= 3.0 + 1e-4);
        assert_relative_eq!(arena[handle].transform.position.y, 5.0);
    }

    #[test]
    fn test_off_axis_motion_is_removed() {
        let (mut arena, handle, mut piston) = setup();
        arena[handle].body.linear_velocity = Vec3::new(0.0, -4.0, 2.0);
        arena[handle].transform.position += Vec3::new(0.0, -0.5, 0.0);

        piston.update_constraint(&mut arena, &InputSignal::default(), 1.0 / 60.0);
        let object = &arena[handle];
        assert_relative_eq!(object.transform.position, Vec3::new(0.0, 5.0, 0.0));
        assert_relative_eq!(object.body.linear_velocity.y, 0.0);
        assert_relative_eq!(object.body.linear_velocity.z, 0.0);
    }
}
