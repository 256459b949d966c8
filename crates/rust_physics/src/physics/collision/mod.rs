//! Collision geometry
//!
//! # Module Organization
//!
//! - [`shape`] - Collision volumes attached to objects
//! - [`primitives`] - Rays and planes
//! - [`ray`] - Ray queries against every volume
//! - [`narrow_phase`] - Shape-pair tests producing contact points

pub mod narrow_phase;
pub mod primitives;
pub mod ray;
pub mod shape;

pub use narrow_phase::{intersect, CollisionInfo, ContactPoint};
pub use primitives::{Plane, Ray, RayCollision};
pub use ray::ray_intersect;
pub use shape::{CollisionShape, ShapeKind};
