//! Sequential-impulse constraints
//!
//! Each constraint corrects its bodies' velocities once per update with a
//! Baumgarte-biased impulse, so positional drift is removed gradually
//! through the velocity solve instead of by snapping positions.
//!
//! External input (steering, triggers) reaches constraints through
//! [`ConstraintInput`]. Input is consumed by the update it is delivered to;
//! callers that want continuous steering must set it again every frame.

use std::any::Any;
use std::collections::HashMap;

use crate::foundation::math::Vec3;
use crate::physics::world::{BodyHandle, ConstraintHandle, ObjectArena};

pub mod balancing;
pub mod piston;
pub mod position;

pub use balancing::BalancingPlaneConstraint;
pub use piston::{PistonConstraint, PistonState};
pub use position::PositionConstraint;

/// Baumgarte factor shared by the built-in constraints
pub const DEFAULT_BIAS_FACTOR: f32 = 0.01;

/// Input delivered to one constraint for one update
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSignal {
    /// Angular impulse to inject (balancing platforms)
    pub steering: Vec3,
    /// Start a cycle (pistons)
    pub trigger: bool,
}

/// Per-frame input for every constraint, keyed by handle
#[derive(Debug, Clone, Default)]
pub struct ConstraintInput {
    signals: HashMap<ConstraintHandle, InputSignal>,
}

impl ConstraintInput {
    /// No input
    pub fn new() -> Self {
        Self::default()
    }

    /// Add steering for the next update of `handle`
    pub fn steer(&mut self, handle: ConstraintHandle, angular_impulse: Vec3) {
        self.signals.entry(handle).or_default().steering += angular_impulse;
    }

    /// Fire the trigger of `handle` on its next update
    pub fn trigger(&mut self, handle: ConstraintHandle) {
        self.signals.entry(handle).or_default().trigger = true;
    }

    /// Remove and return the input for `handle`; zero when none was set
    pub fn take(&mut self, handle: ConstraintHandle) -> InputSignal {
        self.signals.remove(&handle).unwrap_or_default()
    }

    /// Drop every pending signal
    pub fn clear(&mut self) {
        self.signals.clear();
    }

    /// True when no signal is pending
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

/// A joint between one or more bodies
pub trait Constraint {
    /// Apply this update's corrective impulses
    fn update_constraint(&mut self, objects: &mut ObjectArena, input: &InputSignal, dt: f32);

    /// Every body this constraint reads or writes
    fn bodies(&self) -> &[BodyHandle];

    /// Short type name for logs
    fn name(&self) -> &'static str;

    /// Downcast to Any for type-specific access
    fn as_any(&self) -> &dyn Any;

    /// Downcast to Any for mutable type-specific access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Impulse along `direction` that sets a single body's velocity component
/// to `target`; zero for immovable bodies.
pub(crate) fn velocity_correction(velocity: Vec3, direction: Vec3, target: f32, inverse_mass: f32) -> Vec3 {
    if inverse_mass <= 0.0 {
        return Vec3::zeros();
    }
    let lambda = (target - velocity.dot(&direction)) / inverse_mass;
    direction * lambda
}
