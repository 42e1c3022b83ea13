use super::node_2d::Node2D;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// 2D clipping container. When `clip` is set, the frame's rectangle becomes
/// the scissor region for its whole subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame2D {
    pub size: Vec2,

    #[serde(default = "default_clip")]
    pub clip: bool,

    #[serde(flatten)]
    pub base: Node2D,
}

fn default_clip() -> bool {
    true
}

impl Frame2D {
    pub fn new(name: &str, width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            clip: true,
            base: Node2D::new(name),
        }
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    pub fn set_clip(&mut self, clip: bool) {
        self.clip = clip;
    }
}

impl Default for Frame2D {
    fn default() -> Self {
        Self::new("Frame2D", 100.0, 100.0)
    }
}

impl Deref for Frame2D {
    type Target = Node2D;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl DerefMut for Frame2D {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.base
    }
}
