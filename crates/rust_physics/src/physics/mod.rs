//! Rigid-body physics
//!
//! [`PhysicsWorld`] owns objects and constraints; [`PhysicsSystem`] advances
//! it one frame at a time: broad phase, narrow phase, constraints,
//! integration and contact resolution, then collision notifications.

pub mod body;
pub mod collision;
pub mod collision_layers;
pub mod constraint;
pub mod events;
pub mod object;
pub mod resolution;
pub mod system;
pub mod world;

#[cfg(test)]
mod tests;

pub use body::{CollisionResponse, RigidBody};
pub use collision::{CollisionInfo, CollisionShape, ContactPoint, Plane, Ray, RayCollision};
pub use collision_layers::CollisionLayers;
pub use constraint::{
    BalancingPlaneConstraint, Constraint, ConstraintInput, InputSignal, PistonConstraint, PistonState,
    PositionConstraint,
};
pub use events::{CollisionEvent, CollisionEventKind, CollisionHandler, CollisionPeer, WorldCommands};
pub use object::PhysicsObject;
pub use resolution::SpringSettings;
pub use system::{CollisionPair, PhysicsSystem};
pub use world::{BodyHandle, ConstraintHandle, ObjectArena, PhysicsWorld, RayHit, WorldError};
