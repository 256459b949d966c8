//! Frame pipeline
//!
//! One [`PhysicsSystem::update`] call runs, in order:
//!
//! 1. clear forces, then add gravity as `gravity * mass`
//! 2. broad phase over fattened bounds, filtered by layers
//! 3. narrow phase, producing this frame's confirmed collisions
//! 4. constraints, in world order
//! 5. velocity integration, then position integration
//! 6. `num_collision_frames` passes of narrow phase + contact resolution;
//!    pairs found here join the confirmed collisions
//! 7. begin/end notifications, then the edits handlers queued
//!
//! The world is never edited structurally while a step is running.

use std::collections::HashSet;

use crate::config::PhysicsConfig;
use crate::foundation::math::Vec3;
use crate::physics::collision::{intersect, CollisionInfo, CollisionShape};
use crate::physics::events::{CollisionEvent, CollisionEventKind, CollisionPeer, WorldCommands};
use crate::physics::object::PhysicsObject;
use crate::physics::resolution::resolve_contact;
use crate::physics::world::{BodyHandle, ObjectArena, PhysicsWorld};
use crate::spatial::{BruteForceSpatialQuery, QuadTreeSpatialQuery, SpatialEntry, SpatialQuery};

/// Unordered pair of objects, smaller handle first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    /// Smaller handle
    pub entity_a: BodyHandle,
    /// Larger handle
    pub entity_b: BodyHandle,
}

impl CollisionPair {
    /// Create a new collision pair (always stores the smaller handle first)
    pub fn new(entity_a: BodyHandle, entity_b: BodyHandle) -> Self {
        if entity_a < entity_b {
            Self { entity_a, entity_b }
        } else {
            Self {
                entity_a: entity_b,
                entity_b: entity_a,
            }
        }
    }
}

/// Drives a [`PhysicsWorld`] forward in time
pub struct PhysicsSystem {
    config: PhysicsConfig,
    broad_phase: Box<dyn SpatialQuery<BodyHandle>>,
    collisions: Vec<CollisionInfo>,
    events: Vec<CollisionEvent>,
    current_pairs: HashSet<CollisionPair>,
    previous_pairs: HashSet<CollisionPair>,
    commands: WorldCommands,
}

impl Default for PhysicsSystem {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl PhysicsSystem {
    /// System using `config`
    pub fn new(config: PhysicsConfig) -> Self {
        let broad_phase = Self::make_broad_phase(&config);
        Self {
            config,
            broad_phase,
            collisions: Vec::new(),
            events: Vec::new(),
            current_pairs: HashSet::new(),
            previous_pairs: HashSet::new(),
            commands: WorldCommands::new(),
        }
    }

    fn make_broad_phase(config: &PhysicsConfig) -> Box<dyn SpatialQuery<BodyHandle>> {
        if config.use_broad_phase {
            Box::new(QuadTreeSpatialQuery::new(config.broad_phase.clone()))
        } else {
            Box::new(BruteForceSpatialQuery::new())
        }
    }

    /// Current settings
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Set the gravity acceleration
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.config.gravity = gravity;
    }

    /// Turn gravity on or off
    pub fn use_gravity(&mut self, state: bool) {
        self.config.use_gravity = state;
    }

    /// Set the angular damping base
    pub fn set_global_damping(&mut self, damping: f32) {
        if !(0.0..=1.0).contains(&damping) {
            log::warn!("Global damping {} clamped into [0, 1]", damping);
        }
        self.config.global_damping = damping.clamp(0.0, 1.0);
    }

    /// Set the per-second linear damping
    pub fn set_linear_damping(&mut self, damping: f32) {
        if damping < 0.0 {
            log::warn!("Linear damping {} clamped to 0", damping);
        }
        self.config.linear_damping = damping.max(0.0);
    }

    /// Current linear damping
    pub fn linear_damping(&self) -> f32 {
        self.config.linear_damping
    }

    /// Number of resolution passes per update (at least one)
    pub fn set_num_collision_frames(&mut self, frames: u32) {
        self.config.num_collision_frames = frames.max(1);
    }

    /// Switch between the quad-tree and testing every pair
    pub fn set_use_broad_phase(&mut self, state: bool) {
        if self.config.use_broad_phase != state {
            self.config.use_broad_phase = state;
            self.broad_phase = Self::make_broad_phase(&self.config);
        }
    }

    /// The broad-phase structure built by the last update
    pub fn broad_phase(&self) -> &dyn SpatialQuery<BodyHandle> {
        self.broad_phase.as_ref()
    }

    /// Collisions confirmed by the last update, before or after integration,
    /// with the impulse each contact received and its effective mass
    pub fn collisions(&self) -> &[CollisionInfo] {
        &self.collisions
    }

    /// Begin/end transitions produced by the last update
    pub fn collision_events(&self) -> &[CollisionEvent] {
        &self.events
    }

    /// Forget every cached collision, so the next update reports fresh begins
    pub fn clear(&mut self) {
        self.collisions.clear();
        self.events.clear();
        self.current_pairs.clear();
        self.previous_pairs.clear();
        self.broad_phase.clear();
    }

    /// Advance the world by `dt` seconds
    pub fn update(&mut self, world: &mut PhysicsWorld, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            log::warn!("Ignoring physics update with dt = {}", dt);
            return;
        }

        world.apply_shuffles();
        self.apply_standing_forces(world);

        let candidates = self.broad_phase_pairs(world, dt);
        log::trace!("Broad phase produced {} candidate pairs", candidates.len());

        self.narrow_phase(world.arena(), &candidates);
        world.update_constraints(dt);
        self.integrate(world, dt);
        self.resolve_collisions(world.arena_mut(), &candidates, dt);

        self.update_collision_list(world);
        world.apply_commands(&mut self.commands);
    }

    fn apply_standing_forces(&self, world: &mut PhysicsWorld) {
        let gravity = self.config.gravity;
        let use_gravity = self.config.use_gravity;
        for object in world.arena_mut().values_mut() {
            object.body.clear_forces();
            if use_gravity && object.active && !object.body.is_static() {
                let mass = object.body.mass();
                object.body.add_force(gravity * mass);
            }
        }
    }

    fn broad_phase_pairs(&mut self, world: &PhysicsWorld, dt: f32) -> Vec<(BodyHandle, BodyHandle)> {
        let margin = self.config.broad_phase_margin;
        let entries: Vec<SpatialEntry<BodyHandle>> = world
            .objects()
            .filter(|(_, object)| object.active)
            .filter_map(|(handle, object)| {
                let bounds = object.world_aabb()?;
                let travel = object.body.linear_velocity.abs() * dt;
                Some(SpatialEntry {
                    item: handle,
                    bounds: bounds.expanded(margin).expanded_by(travel),
                    is_static: object.body.is_static(),
                })
            })
            .collect();

        self.broad_phase.rebuild(&entries);

        let arena = world.arena();
        self.broad_phase
            .candidate_pairs()
            .into_iter()
            .filter(|(a, b)| {
                let (Some(object_a), Some(object_b)) = (arena.get(*a), arena.get(*b)) else {
                    return false;
                };
                let (Some(shape_a), Some(shape_b)) = (object_a.shape, object_b.shape) else {
                    return false;
                };
                object_a.accepts(object_b) && CollisionShape::pair_supported(shape_a.kind(), shape_b.kind())
            })
            .collect()
    }

    fn test_pair(arena: &ObjectArena, a: BodyHandle, b: BodyHandle) -> Option<CollisionInfo> {
        let object_a = arena.get(a)?;
        let object_b = arena.get(b)?;
        let contact = intersect(
            object_a.shape.as_ref()?,
            &object_a.transform,
            object_b.shape.as_ref()?,
            &object_b.transform,
        )?;
        Some(CollisionInfo::new(a, b, contact))
    }

    fn narrow_phase(&mut self, arena: &ObjectArena, candidates: &[(BodyHandle, BodyHandle)]) {
        self.collisions = candidates
            .iter()
            .filter_map(|(a, b)| Self::test_pair(arena, *a, *b))
            .collect();
    }

    fn integrate(&self, world: &mut PhysicsWorld, dt: f32) {
        let linear_damping = self.config.linear_damping;
        let global_damping = self.config.global_damping;
        for object in world.arena_mut().values_mut().filter(|o| o.active) {
            object.body.integrate_velocity(dt, linear_damping, global_damping);
        }
        for object in world.arena_mut().values_mut().filter(|o| o.active) {
            let PhysicsObject { body, transform, .. } = object;
            body.integrate_position(transform, dt);
        }
    }

    fn resolve_collisions(&mut self, arena: &mut ObjectArena, candidates: &[(BodyHandle, BodyHandle)], dt: f32) {
        let spring = self.config.spring;
        for _ in 0..self.config.num_collision_frames {
            for (a, b) in candidates {
                let Some(mut info) = Self::test_pair(arena, *a, *b) else {
                    continue;
                };
                let Some([object_a, object_b]) = arena.get_disjoint_mut([*a, *b]) else {
                    continue;
                };
                for contact in &mut info.contacts {
                    resolve_contact(object_a, object_b, contact, dt, &spring);
                }

                // Contacts made during integration count as confirmed too
                match self.collisions.iter_mut().find(|c| c.a == *a && c.b == *b) {
                    Some(confirmed) => confirmed.absorb_pass(&info),
                    None => {
                        log::trace!("Contact {:?} <-> {:?} found while resolving", a, b);
                        self.collisions.push(info);
                    }
                }
            }
        }
    }

    /// Diff this frame's collisions against last frame's and notify handlers
    fn update_collision_list(&mut self, world: &mut PhysicsWorld) {
        std::mem::swap(&mut self.current_pairs, &mut self.previous_pairs);
        self.current_pairs.clear();
        self.events.clear();

        for info in &self.collisions {
            let pair = CollisionPair::new(info.a, info.b);
            if self.current_pairs.insert(pair) && !self.previous_pairs.contains(&pair) {
                self.events.push(CollisionEvent {
                    kind: CollisionEventKind::Begin,
                    a: info.a,
                    b: info.b,
                });
            }
        }

        let mut ended: Vec<CollisionPair> = self.previous_pairs.difference(&self.current_pairs).copied().collect();
        ended.sort_by_key(|pair| (pair.entity_a, pair.entity_b));
        self.events.extend(ended.into_iter().map(|pair| CollisionEvent {
            kind: CollisionEventKind::End,
            a: pair.entity_a,
            b: pair.entity_b,
        }));

        for event in &self.events {
            log::debug!("Collision {:?}: {:?} <-> {:?}", event.kind, event.a, event.b);
            notify(world, event.a, event.b, event.kind, &mut self.commands);
            notify(world, event.b, event.a, event.kind, &mut self.commands);
        }
    }
}

/// Call `this`'s handler about `other`. Missing objects are skipped.
fn notify(
    world: &mut PhysicsWorld,
    this: BodyHandle,
    other: BodyHandle,
    kind: CollisionEventKind,
    commands: &mut WorldCommands,
) {
    let Some((name, layer)) = world.object(other).map(|o| (o.name.clone(), o.layer)) else {
        return;
    };
    let Some(mut handler) = world.object_mut(this).and_then(|o| o.take_handler()) else {
        return;
    };

    let peer = CollisionPeer {
        handle: other,
        name: &name,
        layer,
    };
    match kind {
        CollisionEventKind::Begin => handler.on_collision_begin(this, peer, commands),
        CollisionEventKind::End => handler.on_collision_end(this, peer, commands),
    }

    if let Some(object) = world.object_mut(this) {
        object.restore_handler(Some(handler));
    }
}
