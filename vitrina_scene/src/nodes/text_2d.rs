use super::node_2d::Node2D;
use crate::color::Color;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use vitrina_ids::FontID;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Text run. Glyph rasterization lives behind an external service boundary;
/// the node only carries content, style, and a font handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text2D {
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontID>,

    #[serde(default)]
    pub color: Color,

    #[serde(default)]
    pub align: TextAlign,

    #[serde(flatten)]
    pub base: Node2D,
}

impl Text2D {
    pub fn new(name: &str, content: &str) -> Self {
        Self {
            content: content.to_owned(),
            font: None,
            color: Color::WHITE,
            align: TextAlign::Left,
            base: Node2D::new(name),
        }
    }

    pub fn set_content(&mut self, content: &str) {
        self.content = content.to_owned();
    }

    pub fn set_font(&mut self, font: Option<FontID>) {
        self.font = font;
    }

    pub fn set_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.color = Color::rgba(r, g, b, a);
    }
}

impl Default for Text2D {
    fn default() -> Self {
        Self::new("Text2D", "")
    }
}

impl Deref for Text2D {
    type Target = Node2D;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl DerefMut for Text2D {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.base
    }
}
