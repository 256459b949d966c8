//! Collision notifications and deferred world edits
//!
//! When a pair of objects starts or stops touching, each object's
//! [`CollisionHandler`] is told about the other one. Handlers cannot touch the
//! world while the frame runs; they queue [`WorldCommands`] that the system
//! applies once the frame is complete.

use crate::physics::collision_layers::CollisionLayers;
use crate::physics::world::{BodyHandle, ConstraintHandle};

/// Begin or end of contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionEventKind {
    /// The pair overlaps this frame but did not last frame
    Begin,
    /// The pair overlapped last frame but no longer does
    End,
}

/// A change in contact between two objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionEvent {
    /// Begin or end
    pub kind: CollisionEventKind,
    /// First object of the pair
    pub a: BodyHandle,
    /// Second object of the pair
    pub b: BodyHandle,
}

/// What a handler learns about the object it touched
#[derive(Debug, Clone, Copy)]
pub struct CollisionPeer<'a> {
    /// Handle of the other object
    pub handle: BodyHandle,
    /// Name of the other object
    pub name: &'a str,
    /// Layer of the other object
    pub layer: CollisionLayers,
}

/// Gameplay hook attached to an object. Both methods default to doing nothing.
pub trait CollisionHandler {
    /// `this` started touching `other`
    fn on_collision_begin(&mut self, this: BodyHandle, other: CollisionPeer<'_>, commands: &mut WorldCommands) {
        let _ = (this, other, commands);
    }

    /// `this` stopped touching `other`
    fn on_collision_end(&mut self, this: BodyHandle, other: CollisionPeer<'_>, commands: &mut WorldCommands) {
        let _ = (this, other, commands);
    }
}

/// One queued world edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldCommand {
    /// Remove an object and every constraint referencing it
    RemoveBody(BodyHandle),
    /// Toggle whether an object takes part in the simulation
    SetActive(BodyHandle, bool),
    /// Remove a constraint
    RemoveConstraint(ConstraintHandle),
}

/// Queue of world edits produced during a frame
#[derive(Debug, Clone, Default)]
pub struct WorldCommands {
    queue: Vec<WorldCommand>,
}

impl WorldCommands {
    /// Empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue removal of an object
    pub fn remove_body(&mut self, handle: BodyHandle) {
        self.queue.push(WorldCommand::RemoveBody(handle));
    }

    /// Queue an activity change
    pub fn set_active(&mut self, handle: BodyHandle, active: bool) {
        self.queue.push(WorldCommand::SetActive(handle, active));
    }

    /// Queue removal of a constraint
    pub fn remove_constraint(&mut self, handle: ConstraintHandle) {
        self.queue.push(WorldCommand::RemoveConstraint(handle));
    }

    /// Number of queued edits
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Take every queued edit in submission order
    pub fn drain(&mut self) -> std::vec::Drain<'_, WorldCommand> {
        self.queue.drain(..)
    }
}
