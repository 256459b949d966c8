//! Configuration system
//!
//! [`Config`] gives any serde type TOML/RON file loading keyed on the file
//! extension. [`PhysicsConfig`] carries every tuning knob of the simulation.

pub use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::physics::resolution::SpringSettings;
use crate::spatial::QuadTreeConfig;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value parsed but is outside its valid range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Global simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity acceleration applied to every movable body
    pub gravity: Vec3,
    /// Whether gravity is applied at all
    pub use_gravity: bool,
    /// Per-second linear velocity damping
    pub linear_damping: f32,
    /// Angular damping base, raised to `dt` each frame
    pub global_damping: f32,
    /// Narrow-phase + resolution passes per update
    pub num_collision_frames: u32,
    /// When false every object pair is a broad-phase candidate
    pub use_broad_phase: bool,
    /// Quad-tree layout used by the broad phase
    pub broad_phase: QuadTreeConfig,
    /// Extra padding added to every broad-phase AABB
    pub broad_phase_margin: f32,
    /// Penalty force used by spring contacts
    pub spring: SpringSettings,
    /// Shuffle the constraint list at the start of every update
    pub shuffle_constraints: bool,
    /// Shuffle the object list at the start of every update
    pub shuffle_objects: bool,
    /// Seed for the shuffling RNG; entropy-seeded when absent
    pub shuffle_seed: Option<u64>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.8, 0.0),
            use_gravity: true,
            linear_damping: 0.4,
            global_damping: 0.95,
            num_collision_frames: 5,
            use_broad_phase: true,
            broad_phase: QuadTreeConfig::default(),
            broad_phase_margin: 0.1,
            spring: SpringSettings::default(),
            shuffle_constraints: false,
            shuffle_objects: false,
            shuffle_seed: None,
        }
    }
}

impl Config for PhysicsConfig {}

impl PhysicsConfig {
    /// Load and validate in one step
    pub fn load_validated(path: &str) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        log::debug!("Loaded physics config from {}", path);
        Ok(config)
    }

    /// Check that every value is inside its usable range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity.iter().all(|c| c.is_finite()) {
            return Err(ConfigError::Invalid("gravity must be finite".into()));
        }
        if self.linear_damping < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "linear_damping must be >= 0, got {}",
                self.linear_damping
            )));
        }
        if !(0.0..=1.0).contains(&self.global_damping) {
            return Err(ConfigError::Invalid(format!(
                "global_damping must be in [0, 1], got {}",
                self.global_damping
            )));
        }
        if self.num_collision_frames == 0 {
            return Err(ConfigError::Invalid("num_collision_frames must be at least 1".into()));
        }
        if self.broad_phase_margin < 0.0 {
            return Err(ConfigError::Invalid("broad_phase_margin must be >= 0".into()));
        }
        if self.broad_phase.world_half_size <= 0.0 {
            return Err(ConfigError::Invalid("broad_phase.world_half_size must be > 0".into()));
        }
        if self.spring.stiffness < 0.0 || self.spring.damping < 0.0 {
            return Err(ConfigError::Invalid("spring stiffness and damping must be >= 0".into()));
        }
        if self.broad_phase.max_entries_per_node == 0 {
            return Err(ConfigError::Invalid("broad_phase.max_entries_per_node must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PhysicsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_collision_frames() {
        let config = PhysicsConfig {
            num_collision_frames: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_toml_partial_document_uses_defaults() {
        let config: PhysicsConfig = toml::from_str(
            "gravity = [0.0, -10.0, 0.0]\nnum_collision_frames = 2\n",
        )
        .unwrap();
        assert_eq!(config.gravity, Vec3::new(0.0, -10.0, 0.0));
        assert_eq!(config.num_collision_frames, 2);
        assert!(config.use_broad_phase);
    }

    #[test]
    fn test_ron_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("rust_physics_cfg_{}.ron", std::process::id()));
        let path = path.to_string_lossy().into_owned();

        let config = PhysicsConfig {
            linear_damping: 0.25,
            shuffle_seed: Some(7),
            ..Default::default()
        };
        config.save_to_file(&path).unwrap();
        let loaded = PhysicsConfig::load_validated(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let result = PhysicsConfig::default().save_to_file("physics.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
