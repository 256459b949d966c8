//! # Rust Physics
//!
//! Rigid-body physics and collision core for small 3D games.
//!
//! ## Features
//!
//! - **Narrow Phase**: Sphere, axis-aligned box, oriented box and capsule tests
//! - **Broad Phase**: Quad-tree over the XZ footprint, switchable to brute force
//! - **Solver**: Restitution impulses or penalty springs, with constraints
//! - **Queries**: Raycasts against every object, screen picking
//! - **Gameplay Hooks**: Begin/end collision callbacks with deferred world edits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rust_physics::prelude::*;
//!
//! let mut world = PhysicsWorld::new();
//! let mut system = PhysicsSystem::new(PhysicsConfig::default());
//!
//! world.add_object(PhysicsObject::floor_aabb(Vec3::zeros(), Vec3::new(100.0, 2.0, 100.0)));
//! let ball = world.add_object(PhysicsObject::sphere(Vec3::new(0.0, 50.0, 0.0), 4.0, 2.0));
//!
//! for _ in 0..120 {
//!     system.update(&mut world, 1.0 / 60.0);
//! }
//! println!("Ball at {:?}", world.object(ball).map(|o| o.transform.position));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod physics;
pub mod picking;
pub mod spatial;

/// Common imports for physics users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PhysicsConfig},
        foundation::math::{Transform, Vec2, Vec3},
        physics::{
            BalancingPlaneConstraint, BodyHandle, CollisionHandler, CollisionLayers, CollisionPeer,
            CollisionResponse, CollisionShape, Constraint, ConstraintHandle, PhysicsObject, PhysicsSystem,
            PhysicsWorld, PistonConstraint, PositionConstraint, Ray, RigidBody, WorldCommands,
        },
        picking::{Camera, Viewport},
        spatial::{QuadTreeConfig, AABB},
    };
}
