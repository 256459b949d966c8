//! Collision layer filtering
//!
//! Every object sits on one or more layers and carries a mask of the layers
//! it accepts. A candidate pair only reaches the narrow phase when each side
//! accepts the other.

use bitflags::bitflags;

bitflags! {
    /// Collision layer bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CollisionLayers: u32 {
        /// Anything without a more specific layer
        const DEFAULT = 1 << 0;
        /// Player-controlled bodies
        const PLAYER = 1 << 1;
        /// AI-controlled bodies
        const ENEMY = 1 << 2;
        /// Static level geometry
        const ENVIRONMENT = 1 << 3;
        /// Collectibles such as coins
        const PICKUP = 1 << 4;
        /// Chain links and other constraint-driven parts
        const LINK = 1 << 5;
        /// Volumes that only report begin/end
        const TRIGGER = 1 << 6;
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CollisionLayers {
    /// A's layer must be in B's mask AND B's layer must be in A's mask
    pub fn should_collide(layer_a: Self, mask_a: Self, layer_b: Self, mask_b: Self) -> bool {
        layer_a.intersects(mask_b) && layer_b.intersects(mask_a)
    }
}
