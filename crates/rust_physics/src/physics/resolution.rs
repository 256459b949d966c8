//! Contact response
//!
//! [`CollisionResponse::Impulse`] contacts exchange a restitution-scaled
//! impulse and are pushed apart by their full penetration.
//! [`CollisionResponse::Spring`] contacts get a penalty force proportional
//! to penetration instead, with no positional correction. A contact uses the
//! spring path when either body asks for it.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::physics::body::CollisionResponse;
use crate::physics::collision::ContactPoint;
use crate::physics::object::PhysicsObject;

/// Penalty-force parameters for spring contacts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringSettings {
    /// Force per unit of penetration
    pub stiffness: f32,
    /// Force per unit of approach speed along the normal
    pub damping: f32,
}

impl Default for SpringSettings {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 5.0,
        }
    }
}

/// Resolve one contact between `a` and `b`. Returns the normal impulse applied.
pub fn resolve_contact(
    a: &mut PhysicsObject,
    b: &mut PhysicsObject,
    contact: &mut ContactPoint,
    dt: f32,
    spring: &SpringSettings,
) -> f32 {
    let use_spring = a.body.response == CollisionResponse::Spring
        || b.body.response == CollisionResponse::Spring;
    let impulse = if use_spring {
        resolve_spring(a, b, contact, dt, spring)
    } else {
        resolve_impulse(a, b, contact)
    };
    contact.accumulated_impulse += impulse;
    impulse
}

/// Velocity of the contact point on A relative to the one on B, along the normal.
/// Positive means the bodies are separating.
fn normal_velocity(a: &PhysicsObject, b: &PhysicsObject, contact: &ContactPoint) -> f32 {
    let velocity_a = a.body.linear_velocity + a.body.angular_velocity.cross(&contact.local_a);
    let velocity_b = b.body.linear_velocity + b.body.angular_velocity.cross(&contact.local_b);
    (velocity_a - velocity_b).dot(&contact.normal)
}

/// Angular contribution to the effective mass along the normal
fn angular_effect(object: &PhysicsObject, offset: Vec3, normal: Vec3) -> f32 {
    let inertia = (object.body.inverse_inertia_tensor() * offset.cross(&normal)).cross(&offset);
    inertia.dot(&normal)
}

/// Restitution impulse plus positional correction
pub fn resolve_impulse(a: &mut PhysicsObject, b: &mut PhysicsObject, contact: &mut ContactPoint) -> f32 {
    let inverse_a = a.body.inverse_mass();
    let inverse_b = b.body.inverse_mass();
    let total_mass = inverse_a + inverse_b;
    if total_mass <= 0.0 {
        return 0.0;
    }

    // Separate the bodies, lighter one moving further
    let normal = contact.normal;
    a.transform.position += normal * contact.penetration * (inverse_a / total_mass);
    b.transform.position -= normal * contact.penetration * (inverse_b / total_mass);

    let approach = normal_velocity(a, b, contact);
    if approach > 0.0 {
        return 0.0;
    }

    let effective = total_mass
        + angular_effect(a, contact.local_a, normal)
        + angular_effect(b, contact.local_b, normal);
    if effective <= 0.0 {
        return 0.0;
    }
    contact.normal_mass = 1.0 / effective;

    let restitution = a.body.elasticity * b.body.elasticity;
    let j = -(1.0 + restitution) * approach * contact.normal_mass;
    let full_impulse = normal * j;

    a.body.apply_linear_impulse(full_impulse);
    b.body.apply_linear_impulse(-full_impulse);
    a.body.apply_angular_impulse(contact.local_a.cross(&full_impulse));
    b.body.apply_angular_impulse(contact.local_b.cross(&-full_impulse));

    log::trace!(
        "Impulse {:.4} between '{}' and '{}' (penetration {:.4})",
        j,
        a.name,
        b.name,
        contact.penetration
    );
    j
}

/// Penalty force `stiffness * penetration - damping * normal speed`, applied over `dt`
pub fn resolve_spring(
    a: &mut PhysicsObject,
    b: &mut PhysicsObject,
    contact: &mut ContactPoint,
    dt: f32,
    spring: &SpringSettings,
) -> f32 {
    if a.body.is_static() && b.body.is_static() {
        return 0.0;
    }

    let normal = contact.normal;
    let speed = normal_velocity(a, b, contact);
    let magnitude = (spring.stiffness * contact.penetration - spring.damping * speed).max(0.0);
    let impulse = normal * magnitude * dt;

    a.body.apply_linear_impulse(impulse);
    b.body.apply_linear_impulse(-impulse);
    a.body.apply_angular_impulse(contact.local_a.cross(&impulse));
    b.body.apply_angular_impulse(contact.local_b.cross(&-impulse));

    magnitude * dt
}
