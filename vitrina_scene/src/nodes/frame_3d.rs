use super::node::Node;
use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// 3D placement: translation, Euler rotation (pitch/yaw/roll), non-uniform
/// scale. The matrix composes translation · rotation · scale, so scale is
/// applied first when transforming points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform3D {
    pub position: Vec3,
    /// Euler angles: x = pitch, y = yaw, z = roll.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform3D {
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::ZYX,
            self.rotation.z,
            self.rotation.y,
            self.rotation.x,
        )
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation(), self.position)
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// 3D-transformed container of 2D content.
///
/// A frame always renders through a dedicated off-screen color target of
/// `target_size` pixels, which is then composited into the scene as a
/// textured quad under the frame's full 3D transform. 2D clipping and 3D
/// perspective cannot be combined correctly by direct drawing, so there is
/// no direct-draw mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame3D {
    #[serde(default)]
    pub transform: Transform3D,

    /// Resolution of the off-screen target, in pixels.
    pub target_size: (u32, u32),

    #[serde(flatten)]
    pub node: Node,
}

impl Frame3D {
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        Self {
            transform: Transform3D::default(),
            target_size: (width.max(1), height.max(1)),
            node: Node::new(name),
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.transform.position = Vec3::new(x, y, z);
    }

    pub fn set_rotation(&mut self, pitch: f32, yaw: f32, roll: f32) {
        self.transform.rotation = Vec3::new(pitch, yaw, roll);
    }

    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) {
        self.transform.scale = Vec3::new(x, y, z);
    }

    pub fn set_target_size(&mut self, width: u32, height: u32) {
        self.target_size = (width.max(1), height.max(1));
    }
}

impl Deref for Frame3D {
    type Target = Node;

    fn deref(&self) -> &Self::Target {
        &self.node
    }
}

impl DerefMut for Frame3D {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_survives_identity_rotation_and_scale() {
        let transform = Transform3D {
            position: Vec3::new(1.5, -2.0, 7.25),
            ..Transform3D::default()
        };
        let m = transform.matrix();
        let t = m.col(3);
        assert_eq!(t.x, 1.5);
        assert_eq!(t.y, -2.0);
        assert_eq!(t.z, 7.25);
    }

    #[test]
    fn scale_applies_before_rotation() {
        let transform = Transform3D {
            rotation: Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            scale: Vec3::new(2.0, 1.0, 1.0),
            ..Transform3D::default()
        };
        // Unit X is first scaled to (2,0,0), then yawed 90 deg onto -Z.
        let p = transform.matrix() * glam::Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!(p.x.abs() < 1e-5);
        assert!((p.z - (-2.0)).abs() < 1e-5);
    }
}
