use super::node::Node;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// Plain 2D node: a position and the base tree data. Used directly as a
/// grouping node, and embedded by every concrete 2D node type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Node2D {
    #[serde(default, skip_serializing_if = "is_zero_vec2")]
    pub position: Vec2,

    #[serde(flatten)]
    pub node: Node,
}

fn is_zero_vec2(v: &Vec2) -> bool {
    *v == Vec2::ZERO
}

impl Node2D {
    pub fn new(name: &str) -> Self {
        Self {
            position: Vec2::ZERO,
            node: Node::new(name),
        }
    }

    pub fn at(name: &str, x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            node: Node::new(name),
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
    }
}

impl Deref for Node2D {
    type Target = Node;

    fn deref(&self) -> &Self::Target {
        &self.node
    }
}

impl DerefMut for Node2D {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.node
    }
}
