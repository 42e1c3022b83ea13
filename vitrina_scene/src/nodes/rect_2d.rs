use super::node_2d::Node2D;
use crate::color::Color;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use vitrina_ids::ImageID;

/// Filled rectangle, optionally textured by a shared image. The image is a
/// non-owning handle into the asset store; a nil or stale handle falls back
/// to the flat fill color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rect2D {
    pub size: Vec2,

    #[serde(default)]
    pub color: Color,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageID>,

    #[serde(flatten)]
    pub base: Node2D,
}

impl Rect2D {
    pub fn new(name: &str, width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            color: Color::WHITE,
            image: None,
            base: Node2D::new(name),
        }
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    pub fn set_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.color = Color::rgba(r, g, b, a);
    }

    pub fn set_image(&mut self, image: Option<ImageID>) {
        self.image = image;
    }
}

impl Default for Rect2D {
    fn default() -> Self {
        Self::new("Rect2D", 100.0, 100.0)
    }
}

impl Deref for Rect2D {
    type Target = Node2D;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl DerefMut for Rect2D {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.base
    }
}
