pub mod frame_2d;
pub mod frame_3d;
pub mod node;
pub mod node_2d;
pub mod rect_2d;
pub mod text_2d;

pub use frame_2d::Frame2D;
pub use frame_3d::{Frame3D, Transform3D};
pub use node::Node;
pub use node_2d::Node2D;
pub use rect_2d::Rect2D;
pub use text_2d::{Text2D, TextAlign};

use serde::{Deserialize, Serialize};

/// Capability tag for a scene node. Renderers dispatch on this instead of
/// virtual per-node draw methods, so the data model stays backend-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Node2D,
    Frame2D,
    Rect2D,
    Text2D,
    Frame3D,
}

/// Runs `$body` with `$node` bound to whichever concrete node the enum
/// holds. Base fields are reached through each node's `Deref` chain.
macro_rules! with_node {
    ($value:expr, $node:ident => $body:expr) => {
        match $value {
            SceneNode::Node2D($node) => $body,
            SceneNode::Frame2D($node) => $body,
            SceneNode::Rect2D($node) => $body,
            SceneNode::Text2D($node) => $body,
            SceneNode::Frame3D($node) => $body,
        }
    };
}

/// One node of the scene graph. Pure data; all tree bookkeeping goes
/// through the `Scene` API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SceneNode {
    Node2D(Node2D),
    Frame2D(Frame2D),
    Rect2D(Rect2D),
    Text2D(Text2D),
    Frame3D(Frame3D),
}

impl SceneNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            SceneNode::Node2D(_) => NodeKind::Node2D,
            SceneNode::Frame2D(_) => NodeKind::Frame2D,
            SceneNode::Rect2D(_) => NodeKind::Rect2D,
            SceneNode::Text2D(_) => NodeKind::Text2D,
            SceneNode::Frame3D(_) => NodeKind::Frame3D,
        }
    }

    /// True for nodes that live inside a 2D subtree. `Frame3D` is the only
    /// 3D kind; it may appear only in the scene's root frame list.
    pub fn is_2d(&self) -> bool {
        !matches!(self, SceneNode::Frame3D(_))
    }

    pub fn base(&self) -> &Node {
        with_node!(self, n => &n.node)
    }

    pub fn base_mut(&mut self) -> &mut Node {
        with_node!(self, n => &mut n.node)
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn visible(&self) -> bool {
        self.base().visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.base_mut().visible = visible;
    }

    pub fn as_frame_2d(&self) -> Option<&Frame2D> {
        match self {
            SceneNode::Frame2D(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_frame_2d_mut(&mut self) -> Option<&mut Frame2D> {
        match self {
            SceneNode::Frame2D(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_rect_2d(&self) -> Option<&Rect2D> {
        match self {
            SceneNode::Rect2D(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_rect_2d_mut(&mut self) -> Option<&mut Rect2D> {
        match self {
            SceneNode::Rect2D(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_text_2d(&self) -> Option<&Text2D> {
        match self {
            SceneNode::Text2D(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_text_2d_mut(&mut self) -> Option<&mut Text2D> {
        match self {
            SceneNode::Text2D(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_frame_3d(&self) -> Option<&Frame3D> {
        match self {
            SceneNode::Frame3D(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_frame_3d_mut(&mut self) -> Option<&mut Frame3D> {
        match self {
            SceneNode::Frame3D(n) => Some(n),
            _ => None,
        }
    }
}

impl From<Node2D> for SceneNode {
    fn from(n: Node2D) -> Self {
        SceneNode::Node2D(n)
    }
}

impl From<Frame2D> for SceneNode {
    fn from(n: Frame2D) -> Self {
        SceneNode::Frame2D(n)
    }
}

impl From<Rect2D> for SceneNode {
    fn from(n: Rect2D) -> Self {
        SceneNode::Rect2D(n)
    }
}

impl From<Text2D> for SceneNode {
    fn from(n: Text2D) -> Self {
        SceneNode::Text2D(n)
    }
}

impl From<Frame3D> for SceneNode {
    fn from(n: Frame3D) -> Self {
        SceneNode::Frame3D(n)
    }
}
