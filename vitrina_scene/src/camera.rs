use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Perspective camera. Stateless beyond its fields: view and projection
/// matrices are rebuilt on demand.
///
/// Rotation is Euler pitch/yaw/roll (radians), composed roll-about-Z, then
/// yaw-about-Y, then pitch-about-X — the same fixed order frame transforms
/// use, so camera and frame orientations stay consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    /// Euler angles: x = pitch, y = yaw, z = roll.
    pub rotation: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            // Default: looking at the origin from z = +5.
            position: Vec3::new(0.0, 0.0, 5.0),
            rotation: Vec3::ZERO,
            fov: 60.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }

    /// Stores raw perspective parameters. Degenerate values (fov = 0,
    /// near = far) are kept as-is and produce degenerate matrices rather
    /// than errors.
    pub fn set_perspective(&mut self, fov: f32, aspect: f32, near: f32, far: f32) {
        self.fov = fov;
        self.aspect = aspect;
        self.near = near;
        self.far = far;
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
    }

    pub fn set_rotation(&mut self, pitch: f32, yaw: f32, roll: f32) {
        self.rotation = Vec3::new(pitch, yaw, roll);
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::ZYX,
            self.rotation.z,
            self.rotation.y,
            self.rotation.x,
        )
    }

    /// World-to-view transform: the inverse of the camera's own placement.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position).inverse()
    }

    /// Standard perspective projection (OpenGL-style clip depth).
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.aspect, self.near, self.far)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-5;

    #[test]
    fn projection_focal_length() {
        // fov = 90 deg at aspect 1: the (0,0) entry is 1/tan(45 deg) = 1.
        let mut camera = Camera::new();
        camera.set_perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        let proj = camera.projection_matrix();
        assert!((proj.col(0).x - 1.0).abs() < TOLERANCE);
        assert!((proj.col(3).w).abs() < TOLERANCE);
        assert!((proj.col(2).w - (-1.0)).abs() < TOLERANCE);
    }

    #[test]
    fn view_negates_position_when_unrotated() {
        let camera = Camera::new();
        let view = camera.view_matrix();
        let t = view.col(3);
        assert!((t.x).abs() < TOLERANCE);
        assert!((t.y).abs() < TOLERANCE);
        assert!((t.z - (-5.0)).abs() < TOLERANCE);
    }

    #[test]
    fn view_projection_brings_origin_in_front() {
        let camera = Camera::new();
        let vp = camera.projection_matrix() * camera.view_matrix();
        let clip = vp * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        // Origin is 5 units in front of the camera: positive w, inside depth range.
        assert!(clip.w > 0.0);
        let ndc_z = clip.z / clip.w;
        assert!((-1.0..=1.0).contains(&ndc_z));
    }

    #[test]
    fn yaw_rotates_view() {
        let mut camera = Camera::new();
        camera.set_position(0.0, 0.0, 0.0);
        camera.set_rotation(0.0, std::f32::consts::FRAC_PI_2, 0.0);
        // With the camera yawed 90 deg, a point on -X ends up straight ahead.
        let view = camera.view_matrix();
        let p = view * glam::Vec4::new(-1.0, 0.0, 0.0, 1.0);
        assert!((p.x).abs() < TOLERANCE);
        assert!((p.z - (-1.0)).abs() < TOLERANCE);
    }
}
