//! Pitch/yaw camera used to build picking rays
//!
//! The view matrix is `rot(-pitch, X) * rot(-yaw, Y) * translate(-position)`
//! and the projection is a right-handed OpenGL-style perspective, so NDC depth
//! runs from -1 at the near plane to +1 at the far plane.

use super::{PickingError, Viewport};
use crate::foundation::math::{utils, Mat4, Vec2, Vec3, Vec4};
use crate::physics::collision::Ray;

/// NDC depth used for the near end of a picking ray
pub const NEAR_PICK_DEPTH: f32 = -0.99999;
/// NDC depth used for the far end; exactly 1.0 makes the unprojection unstable
pub const FAR_PICK_DEPTH: f32 = 0.99999;

/// Free-look camera. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World position
    pub position: Vec3,
    /// Rotation about X, positive looks up
    pub pitch: f32,
    /// Rotation about Y, positive turns left
    pub yaw: f32,
    /// Vertical field of view
    pub fov: f32,
    /// Near plane distance
    pub near: f32,
    /// Far plane distance
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            pitch: 0.0,
            yaw: 0.0,
            fov: 45.0,
            near: 1.0,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// Camera at `position` looking down -Z
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder: orientation
    pub fn with_angles(mut self, pitch: f32, yaw: f32) -> Self {
        self.pitch = pitch;
        self.yaw = yaw;
        self
    }

    /// World to view space
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), utils::deg_to_rad(-self.pitch))
            * Mat4::from_axis_angle(&Vec3::y_axis(), utils::deg_to_rad(-self.yaw))
            * Mat4::new_translation(&-self.position)
    }

    /// View to clip space
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::new_perspective(aspect, utils::deg_to_rad(self.fov), self.near, self.far)
    }

    /// Direction the centre of the screen looks along
    pub fn forward(&self) -> Vec3 {
        let rotation = Mat4::from_axis_angle(&Vec3::y_axis(), utils::deg_to_rad(self.yaw))
            * Mat4::from_axis_angle(&Vec3::x_axis(), utils::deg_to_rad(self.pitch));
        rotation.transform_vector(&Vec3::new(0.0, 0.0, -1.0))
    }

    fn view_projection(&self, viewport: &Viewport) -> Mat4 {
        self.projection_matrix(viewport.aspect()) * self.view_matrix()
    }

    /// World position of a screen point. `screen.z` is the NDC depth in [-1, 1].
    pub fn unproject(&self, screen: Vec3, viewport: &Viewport) -> Result<Vec3, PickingError> {
        let ndc = viewport.screen_to_ndc(Vec2::new(screen.x, screen.y))?;
        let inverse = self
            .view_projection(viewport)
            .try_inverse()
            .ok_or(PickingError::SingularMatrix)?;

        let world = inverse * Vec4::new(ndc.x, ndc.y, screen.z, 1.0);
        if world.w.abs() <= f32::EPSILON {
            return Err(PickingError::SingularMatrix);
        }
        Ok(world.xyz() / world.w)
    }

    /// Screen position and NDC depth of a world point, or `None` when it is
    /// behind the camera
    pub fn project(&self, world: Vec3, viewport: &Viewport) -> Option<Vec3> {
        let clip = self.view_projection(viewport) * Vec4::new(world.x, world.y, world.z, 1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        let screen = viewport.ndc_to_screen(Vec2::new(ndc.x, ndc.y));
        Some(Vec3::new(screen.x, screen.y, ndc.z))
    }

    /// Ray from the camera through the pixel at `screen` (top-left origin)
    pub fn build_ray(&self, screen: Vec2, viewport: &Viewport) -> Result<Ray, PickingError> {
        let near = self.unproject(Vec3::new(screen.x, screen.y, NEAR_PICK_DEPTH), viewport)?;
        let far = self.unproject(Vec3::new(screen.x, screen.y, FAR_PICK_DEPTH), viewport)?;

        let ray = Ray::new(self.position, far - near);
        log::trace!("Picking ray {:?} -> {:?}", ray.origin, ray.direction);
        Ok(ray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{PhysicsObject, PhysicsWorld};
    use approx::assert_relative_eq;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    #[test]
    fn test_centre_pixel_looks_forward() {
        let camera = Camera::new(Vec3::new(0.0, 5.0, 20.0));
        let ray = camera.build_ray(Vec2::new(400.0, 300.0), &viewport()).unwrap();
        assert_relative_eq!(ray.direction, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-3);
        assert_relative_eq!(ray.origin, camera.position);

        let turned = camera.with_angles(0.0, 90.0);
        let ray = turned.build_ray(Vec2::new(400.0, 300.0), &viewport()).unwrap();
        assert_relative_eq!(ray.direction, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-3);
        assert_relative_eq!(turned.forward(), Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_top_of_screen_points_up() {
        let camera = Camera::new(Vec3::zeros());
        let ray = camera.build_ray(Vec2::new(400.0, 0.0), &viewport()).unwrap();
        assert!(ray.direction.y > 0.0);
        // Half the vertical field of view above the axis
        let angle = ray.direction.y.atan2(-ray.direction.z);
        assert_relative_eq!(angle, utils::deg_to_rad(22.5), epsilon = 1e-3);
    }

    #[test]
    fn test_unproject_then_project_round_trips() {
        let camera = Camera::new(Vec3::new(3.0, 10.0, 40.0)).with_angles(-20.0, 15.0);
        let viewport = viewport();

        for &(x, y) in &[(200.0, 150.0), (400.0, 300.0), (790.0, 10.0)] {
            for depth in [NEAR_PICK_DEPTH, 0.5, FAR_PICK_DEPTH] {
                let world = camera.unproject(Vec3::new(x, y, depth), &viewport).unwrap();
                let screen = camera.project(world, &viewport).unwrap();
                assert_relative_eq!(screen.x, x, epsilon = 0.05);
                assert_relative_eq!(screen.y, y, epsilon = 0.05);
            }
        }
    }

    #[test]
    fn test_point_behind_camera_does_not_project() {
        let camera = Camera::new(Vec3::zeros());
        assert!(camera.project(Vec3::new(0.0, 0.0, 10.0), &viewport()).is_none());
    }

    #[test]
    fn test_picking_ray_hits_object_under_cursor() {
        let mut world = PhysicsWorld::with_seed(1);
        let sphere = world.add_object(PhysicsObject::sphere(Vec3::zeros(), 2.0, 1.0));
        let camera = Camera::new(Vec3::new(0.0, 0.0, 50.0));

        let ray = camera.build_ray(Vec2::new(400.0, 300.0), &viewport()).unwrap();
        let hit = world.raycast(&ray, None).unwrap();
        assert_eq!(hit.entity, sphere);
        assert_relative_eq!(hit.distance, 48.0, epsilon = 1e-2);

        let corner = camera.build_ray(Vec2::new(5.0, 5.0), &viewport()).unwrap();
        assert!(world.raycast(&corner, None).is_none());
    }

    #[test]
    fn test_degenerate_viewport_is_an_error() {
        let camera = Camera::default();
        let result = camera.build_ray(Vec2::zeros(), &Viewport::new(0.0, 0.0));
        assert!(matches!(result, Err(PickingError::DegenerateViewport { .. })));
    }
}
