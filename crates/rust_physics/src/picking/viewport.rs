//! Screen rectangle and pixel <-> NDC conversion

use super::PickingError;
use crate::foundation::math::Vec2;

/// Pixel size of the surface being picked on. Pixel (0, 0) is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Viewport {
    /// Viewport of the given pixel size
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width / height
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    fn check(&self) -> Result<(), PickingError> {
        if self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite() {
            Ok(())
        } else {
            Err(PickingError::DegenerateViewport {
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Pixel position to normalized device coordinates in [-1, 1], y pointing up
    pub fn screen_to_ndc(&self, screen: Vec2) -> Result<Vec2, PickingError> {
        self.check()?;
        Ok(Vec2::new(
            screen.x / self.width * 2.0 - 1.0,
            1.0 - screen.y / self.height * 2.0,
        ))
    }

    /// Normalized device coordinates back to a pixel position
    pub fn ndc_to_screen(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
        )
    }
}
