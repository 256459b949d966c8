//! Simulation world: object and constraint arenas
//!
//! Objects and constraints live in slotmaps and are referred to by stable
//! handles. A removed object's handle simply stops resolving, and every
//! constraint that referenced it is removed along with it.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use slotmap::{new_key_type, SlotMap};

use crate::config::PhysicsConfig;
use crate::foundation::math::Vec3;
use crate::physics::collision::{ray_intersect, Ray};
use crate::physics::constraint::{Constraint, ConstraintInput};
use crate::physics::events::{WorldCommand, WorldCommands};
use crate::physics::object::PhysicsObject;

new_key_type! {
    /// Stable reference to an object in a [`PhysicsWorld`]
    pub struct BodyHandle;

    /// Stable reference to a constraint in a [`PhysicsWorld`]
    pub struct ConstraintHandle;
}

/// Object storage shared with constraints
pub type ObjectArena = SlotMap<BodyHandle, PhysicsObject>;

/// World population errors
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldError {
    /// The object was removed or never existed
    #[error("stale body handle {0:?}")]
    StaleBody(BodyHandle),

    /// The constraint was removed or never existed
    #[error("stale constraint handle {0:?}")]
    StaleConstraint(ConstraintHandle),
}

/// Nearest object along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The object that was hit
    pub entity: BodyHandle,
    /// World-space hit point
    pub point: Vec3,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Objects, constraints and their evaluation order
pub struct PhysicsWorld {
    objects: ObjectArena,
    constraints: SlotMap<ConstraintHandle, Box<dyn Constraint>>,
    object_order: Vec<BodyHandle>,
    constraint_order: Vec<ConstraintHandle>,
    constraint_input: ConstraintInput,
    shuffle_objects: bool,
    shuffle_constraints: bool,
    rng: StdRng,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Empty world with an entropy-seeded shuffle RNG
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Empty world whose shuffles are reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Empty world taking its shuffle flags and seed from `config`
    pub fn from_config(config: &PhysicsConfig) -> Self {
        let mut world = config.shuffle_seed.map_or_else(Self::new, Self::with_seed);
        world.shuffle_objects = config.shuffle_objects;
        world.shuffle_constraints = config.shuffle_constraints;
        world
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            objects: ObjectArena::with_key(),
            constraints: SlotMap::with_key(),
            object_order: Vec::new(),
            constraint_order: Vec::new(),
            constraint_input: ConstraintInput::new(),
            shuffle_objects: false,
            shuffle_constraints: false,
            rng,
        }
    }

    /// Add an object; it takes part from the next update
    pub fn add_object(&mut self, object: PhysicsObject) -> BodyHandle {
        let name = object.name.clone();
        let handle = self.objects.insert(object);
        self.object_order.push(handle);
        log::debug!("Added object '{}' as {:?}", name, handle);
        handle
    }

    /// Remove an object and every constraint that references it
    pub fn remove_object(&mut self, handle: BodyHandle) -> Result<PhysicsObject, WorldError> {
        let object = self.objects.remove(handle).ok_or(WorldError::StaleBody(handle))?;
        self.object_order.retain(|h| *h != handle);

        let dependent: Vec<ConstraintHandle> = self
            .constraint_order
            .iter()
            .copied()
            .filter(|c| self.constraints[*c].bodies().contains(&handle))
            .collect();
        for constraint in dependent {
            let _ = self.remove_constraint(constraint);
        }

        log::debug!("Removed object '{}' ({:?})", object.name, handle);
        Ok(object)
    }

    /// Add a constraint. Every body it references must be alive.
    pub fn add_constraint(&mut self, constraint: impl Constraint + 'static) -> Result<ConstraintHandle, WorldError> {
        self.add_boxed_constraint(Box::new(constraint))
    }

    /// Add an already boxed constraint
    pub fn add_boxed_constraint(&mut self, constraint: Box<dyn Constraint>) -> Result<ConstraintHandle, WorldError> {
        if let Some(stale) = constraint.bodies().iter().find(|h| !self.objects.contains_key(**h)) {
            return Err(WorldError::StaleBody(*stale));
        }

        let name = constraint.name();
        let handle = self.constraints.insert(constraint);
        self.constraint_order.push(handle);
        log::debug!("Added {} as {:?}", name, handle);
        Ok(handle)
    }

    /// Remove a constraint
    pub fn remove_constraint(&mut self, handle: ConstraintHandle) -> Result<Box<dyn Constraint>, WorldError> {
        let constraint = self
            .constraints
            .remove(handle)
            .ok_or(WorldError::StaleConstraint(handle))?;
        self.constraint_order.retain(|h| *h != handle);
        log::debug!("Removed {} ({:?})", constraint.name(), handle);
        Ok(constraint)
    }

    /// Look up an object
    pub fn object(&self, handle: BodyHandle) -> Option<&PhysicsObject> {
        self.objects.get(handle)
    }

    /// Look up an object for modification
    pub fn object_mut(&mut self, handle: BodyHandle) -> Option<&mut PhysicsObject> {
        self.objects.get_mut(handle)
    }

    /// Look up a constraint
    pub fn constraint(&self, handle: ConstraintHandle) -> Option<&dyn Constraint> {
        self.constraints.get(handle).map(|c| c.as_ref())
    }

    /// Look up a constraint for modification
    pub fn constraint_mut(&mut self, handle: ConstraintHandle) -> Option<&mut (dyn Constraint + 'static)> {
        self.constraints.get_mut(handle).map(|c| c.as_mut())
    }

    /// Enable or disable an object
    pub fn set_active(&mut self, handle: BodyHandle, active: bool) -> Result<(), WorldError> {
        let object = self.objects.get_mut(handle).ok_or(WorldError::StaleBody(handle))?;
        if object.active != active {
            log::debug!("Object '{}' active = {}", object.name, active);
            object.active = active;
        }
        Ok(())
    }

    /// Objects in evaluation order
    pub fn objects(&self) -> impl Iterator<Item = (BodyHandle, &PhysicsObject)> + '_ {
        self.object_order.iter().map(move |h| (*h, &self.objects[*h]))
    }

    /// Object handles in evaluation order
    pub fn object_handles(&self) -> &[BodyHandle] {
        &self.object_order
    }

    /// Constraint handles in evaluation order
    pub fn constraint_handles(&self) -> &[ConstraintHandle] {
        &self.constraint_order
    }

    /// Number of objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of constraints
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Input read by constraints on the next update
    pub fn constraint_input_mut(&mut self) -> &mut ConstraintInput {
        &mut self.constraint_input
    }

    pub(crate) fn arena(&self) -> &ObjectArena {
        &self.objects
    }

    pub(crate) fn arena_mut(&mut self) -> &mut ObjectArena {
        &mut self.objects
    }

    /// Shuffle the object order at the start of every update
    pub fn set_shuffle_objects(&mut self, state: bool) {
        self.shuffle_objects = state;
    }

    /// Shuffle the constraint order at the start of every update
    pub fn set_shuffle_constraints(&mut self, state: bool) {
        self.shuffle_constraints = state;
    }

    /// Shuffle the object order once
    pub fn shuffle_objects_now(&mut self) {
        self.object_order.shuffle(&mut self.rng);
    }

    /// Shuffle the constraint order once
    pub fn shuffle_constraints_now(&mut self) {
        self.constraint_order.shuffle(&mut self.rng);
    }

    /// Apply the enabled per-update shuffles
    pub fn apply_shuffles(&mut self) {
        if self.shuffle_objects {
            self.shuffle_objects_now();
        }
        if self.shuffle_constraints {
            self.shuffle_constraints_now();
        }
    }

    /// Run every constraint once, in order. Constraints touching an inactive
    /// object are skipped. Pending input is consumed either way.
    pub fn update_constraints(&mut self, dt: f32) {
        for handle in &self.constraint_order {
            let signal = self.constraint_input.take(*handle);
            let Some(constraint) = self.constraints.get_mut(*handle) else {
                continue;
            };
            let all_active = constraint
                .bodies()
                .iter()
                .all(|b| self.objects.get(*b).map_or(false, |o| o.active));
            if !all_active {
                continue;
            }
            constraint.update_constraint(&mut self.objects, &signal, dt);
        }
        self.constraint_input.clear();
    }

    /// Nearest active object with a volume along `ray`, skipping `ignore`.
    /// Objects that enclose the ray origin are not reported.
    pub fn raycast(&self, ray: &Ray, ignore: Option<BodyHandle>) -> Option<RayHit> {
        self.raycast_all(ray, ignore).into_iter().next()
    }

    /// Every hit along `ray`, nearest first
    pub fn raycast_all(&self, ray: &Ray, ignore: Option<BodyHandle>) -> Vec<RayHit> {
        let mut hits: Vec<RayHit> = self
            .objects()
            .filter(|(handle, object)| object.active && Some(*handle) != ignore)
            .filter_map(|(handle, object)| {
                let shape = object.shape.as_ref()?;
                let hit = ray_intersect(ray, shape, &object.transform)?;
                (hit.distance >= 0.0).then_some(RayHit {
                    entity: handle,
                    point: hit.point,
                    distance: hit.distance,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Apply queued edits. Edits naming stale handles are skipped.
    pub fn apply_commands(&mut self, commands: &mut WorldCommands) {
        for command in commands.drain() {
            let result = match command {
                WorldCommand::RemoveBody(handle) => self.remove_object(handle).map(|_| ()),
                WorldCommand::SetActive(handle, active) => self.set_active(handle, active),
                WorldCommand::RemoveConstraint(handle) => self.remove_constraint(handle).map(|_| ()),
            };
            if let Err(e) = result {
                log::trace!("Skipped deferred {:?}: {}", command, e);
            }
        }
    }

    /// Remove every object and constraint
    pub fn clear(&mut self) {
        self.objects.clear();
        self.constraints.clear();
        self.object_order.clear();
        self.constraint_order.clear();
        self.constraint_input.clear();
        log::debug!("World cleared");
    }
}
