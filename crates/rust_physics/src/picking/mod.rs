//! Mouse picking: turning a pixel into a world-space [`Ray`](crate::physics::Ray)

pub mod camera;
pub mod viewport;

pub use camera::Camera;
pub use viewport::Viewport;

use thiserror::Error;

/// Picking errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PickingError {
    /// View-projection matrix cannot be inverted
    #[error("View-projection matrix is singular")]
    SingularMatrix,

    /// Viewport with no area
    #[error("Degenerate viewport {width}x{height}")]
    DegenerateViewport {
        /// Width in pixels
        width: f32,
        /// Height in pixels
        height: f32,
    },
}
