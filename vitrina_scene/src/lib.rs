//! Pure-data scene graph: node types, arena storage, camera, scene root.
//!
//! Nothing in this crate touches the GPU. Renderers walk the tree through
//! the [`Scene`] API and pattern-match on [`SceneNode`] kinds.

pub mod arena;
pub mod camera;
pub mod color;
pub mod nodes;
pub mod scene;

pub use arena::NodeArena;
pub use camera::Camera;
pub use color::Color;
pub use nodes::{
    Frame2D, Frame3D, Node, Node2D, NodeKind, Rect2D, SceneNode, Text2D, TextAlign, Transform3D,
};
pub use scene::{Scene, SceneError};

pub use glam::{Mat4, Quat, Vec2, Vec3};
pub use vitrina_ids::NodeID;
