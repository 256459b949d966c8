//! Math utilities and types
//!
//! Thin aliases over nalgebra plus the [`Transform`] every simulated object owns.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// World-space placement of a body: position, orientation and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Orientation (unit quaternion)
    pub rotation: Quat,

    /// Scale factors. Inertia initialisers read this, shapes do not.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Builder: replace the scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Builder: replace the orientation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Rotation part as a 3x3 matrix
    pub fn rotation_matrix(&self) -> Mat3 {
        self.rotation.to_rotation_matrix().into_inner()
    }

    /// Express a world-space point in this transform's unrotated local frame.
    /// Scale is ignored: collision volumes carry their own dimensions.
    pub fn to_local(&self, world_point: Vec3) -> Vec3 {
        self.rotation.inverse() * (world_point - self.position)
    }

    /// Inverse of [`Transform::to_local`]
    pub fn to_world(&self, local_point: Vec3) -> Vec3 {
        self.rotation * local_point + self.position
    }

    /// Local +Z axis in world space
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::z()
    }

    /// Local +Y axis in world space
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::y()
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Squared length below which a direction is treated as zero
    pub const DEGENERATE_LENGTH_SQ: f32 = 1.0e-12;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Quat, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Clamp every component of `value` into `[min, max]`
    pub fn clamp_vec(value: Vec3, min: Vec3, max: Vec3) -> Vec3 {
        Vec3::new(
            value.x.clamp(min.x, max.x),
            value.y.clamp(min.y, max.y),
            value.z.clamp(min.z, max.z),
        )
    }

    /// Normalize `v`, or `None` when it is too short to carry a direction
    pub fn try_normalize(v: Vec3) -> Option<Vec3> {
        let length_sq = v.magnitude_squared();
        if length_sq <= constants::DEGENERATE_LENGTH_SQ || !length_sq.is_finite() {
            None
        } else {
            Some(v / length_sq.sqrt())
        }
    }

    /// Orientation from per-axis Euler angles in degrees, composed X * Y * Z
    pub fn quat_from_euler_degrees(degrees: Vec3) -> Quat {
        Quat::from_axis_angle(&Vec3::x_axis(), deg_to_rad(degrees.x))
            * Quat::from_axis_angle(&Vec3::y_axis(), deg_to_rad(degrees.y))
            * Quat::from_axis_angle(&Vec3::z_axis(), deg_to_rad(degrees.z))
    }
}
