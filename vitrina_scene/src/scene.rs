use crate::arena::NodeArena;
use crate::camera::Camera;
use crate::nodes::{Frame3D, SceneNode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vitrina_ids::NodeID;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate node id {0}")]
    DuplicateNode(NodeID),
    #[error("node {0} links to missing node {1}")]
    DanglingLink(NodeID, NodeID),
    #[error("frame list entry {0} is missing or not a Frame3D")]
    InvalidFrame(NodeID),
}

/// Root of the scene hierarchy: an arena of nodes, an ordered list of
/// root `Frame3D`s, and one camera.
///
/// All tree links (parent back-references, child lists) are maintained
/// here. The operations are forgiving at the API boundary — nil or stale
/// IDs make an operation a `false` no-op rather than a panic.
pub struct Scene {
    arena: NodeArena,
    frames: Vec<NodeID>,
    camera: Camera,
    next_index: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            frames: Vec::new(),
            camera: Camera::new(),
            next_index: 0,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    fn alloc_id(&mut self) -> NodeID {
        self.next_index += 1;
        NodeID::from_parts(self.next_index, 0)
    }

    /// Allocate a detached node and return its handle.
    pub fn spawn(&mut self, node: impl Into<SceneNode>) -> NodeID {
        let mut node = node.into();
        let id = self.alloc_id();
        node.base_mut().id = id;
        node.base_mut().parent = None;
        node.base_mut().children.clear();
        self.arena.insert(id, node);
        id
    }

    /// Spawn a `Frame3D` and append it to the scene's root frame list.
    pub fn add_frame(&mut self, frame: Frame3D) -> NodeID {
        let id = self.spawn(frame);
        self.frames.push(id);
        id
    }

    /// Remove a root frame and despawn its whole subtree.
    pub fn remove_frame(&mut self, id: NodeID) -> bool {
        if !self.frames.contains(&id) {
            return false;
        }
        self.despawn(id)
    }

    pub fn frames(&self) -> &[NodeID] {
        &self.frames
    }

    /// Despawn every root frame and its subtree.
    pub fn clear(&mut self) {
        for id in std::mem::take(&mut self.frames) {
            self.despawn_subtree(id);
        }
    }

    pub fn get(&self, id: NodeID) -> Option<&SceneNode> {
        self.arena.get(id)
    }

    pub fn get_mut(&mut self, id: NodeID) -> Option<&mut SceneNode> {
        self.arena.get_mut(id)
    }

    pub fn children(&self, id: NodeID) -> &[NodeID] {
        self.arena
            .get(id)
            .map(|n| n.base().children.as_slice())
            .unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeID, &SceneNode)> {
        self.arena.iter()
    }

    /// Attach `child` under `parent`, appending to the child list.
    ///
    /// No-op (`false`) when either ID is stale or nil, when the child is
    /// already a child of this parent, or when the child is a `Frame3D`
    /// (frames live only in the root list). A child attached elsewhere is
    /// detached from its previous parent first, so it is never linked from
    /// two parents at once.
    pub fn add_child(&mut self, parent: NodeID, child: NodeID) -> bool {
        if parent == child || !self.arena.contains(parent) {
            return false;
        }
        let Some(child_node) = self.arena.get(child) else {
            return false;
        };
        if !child_node.is_2d() {
            return false;
        }
        if child_node.base().parent == Some(parent) {
            return false;
        }

        if let Some(old_parent) = child_node.base().parent {
            if let Some(node) = self.arena.get_mut(old_parent) {
                node.base_mut().children.retain(|c| *c != child);
            }
        }
        if let Some(node) = self.arena.get_mut(child) {
            node.base_mut().parent = Some(parent);
        }
        if let Some(node) = self.arena.get_mut(parent) {
            node.base_mut().children.push(child);
        }
        true
    }

    /// Detach `child` from `parent`. No-op (`false`) if it is not a child
    /// of that parent; otherwise the child's parent back-reference is
    /// cleared and the node stays alive, detached.
    pub fn remove_child(&mut self, parent: NodeID, child: NodeID) -> bool {
        let Some(parent_node) = self.arena.get_mut(parent) else {
            return false;
        };
        let children = &mut parent_node.base_mut().children;
        let Some(pos) = children.iter().position(|c| *c == child) else {
            return false;
        };
        children.remove(pos);
        if let Some(node) = self.arena.get_mut(child) {
            node.base_mut().parent = None;
        }
        true
    }

    /// Remove a node and its entire subtree. Detaches from the parent (or
    /// the root frame list) first.
    pub fn despawn(&mut self, id: NodeID) -> bool {
        if !self.arena.contains(id) {
            return false;
        }
        if let Some(parent) = self.arena.get(id).and_then(|n| n.base().parent) {
            if let Some(node) = self.arena.get_mut(parent) {
                node.base_mut().children.retain(|c| *c != id);
            }
        }
        self.frames.retain(|f| *f != id);
        self.despawn_subtree(id);
        true
    }

    fn despawn_subtree(&mut self, id: NodeID) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.arena.remove(next) {
                stack.extend(node.base().children.iter().copied());
            }
        }
    }

    pub fn to_json(&self) -> Result<String, SceneError> {
        let nodes = self
            .arena
            .iter()
            .map(|(id, node)| NodeEntry {
                id,
                node: node.clone(),
            })
            .collect();
        let data = SceneData {
            next_index: self.next_index,
            frames: self.frames.clone(),
            camera: self.camera.clone(),
            nodes,
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let data: SceneData = serde_json::from_str(json)?;

        let mut scene = Scene::new();
        scene.camera = data.camera;
        let mut max_index = 0u32;
        for entry in data.nodes {
            let NodeEntry { id, mut node } = entry;
            if id.is_nil() || scene.arena.contains(id) {
                return Err(SceneError::DuplicateNode(id));
            }
            node.base_mut().id = id;
            max_index = max_index.max(id.index());
            scene.arena.insert(id, node);
        }

        // Links must all resolve before the scene is usable.
        for (id, node) in scene.arena.iter() {
            if let Some(parent) = node.base().parent {
                if !scene.arena.contains(parent) {
                    return Err(SceneError::DanglingLink(id, parent));
                }
            }
            for child in &node.base().children {
                if !scene.arena.contains(*child) {
                    return Err(SceneError::DanglingLink(id, *child));
                }
            }
        }
        for frame in &data.frames {
            let ok = scene
                .arena
                .get(*frame)
                .map(|n| n.as_frame_3d().is_some())
                .unwrap_or(false);
            if !ok {
                return Err(SceneError::InvalidFrame(*frame));
            }
        }

        scene.frames = data.frames;
        scene.next_index = data.next_index.max(max_index);
        Ok(scene)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Deserialize)]
struct NodeEntry {
    id: NodeID,
    node: SceneNode,
}

#[derive(Serialize, Deserialize)]
struct SceneData {
    next_index: u32,
    frames: Vec<NodeID>,
    camera: Camera,
    nodes: Vec<NodeEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Frame2D, Node2D, Rect2D};

    #[test]
    fn add_child_sets_parent_and_appears_once() {
        let mut scene = Scene::new();
        let a = scene.spawn(Node2D::new("a"));
        let b = scene.spawn(Node2D::new("b"));

        assert!(scene.add_child(a, b));
        assert_eq!(scene.get(b).unwrap().base().parent, Some(a));
        assert_eq!(scene.children(a), &[b]);

        // Already attached: no-op, still exactly once.
        assert!(!scene.add_child(a, b));
        assert_eq!(scene.children(a), &[b]);
    }

    #[test]
    fn remove_child_clears_back_reference() {
        let mut scene = Scene::new();
        let a = scene.spawn(Node2D::new("a"));
        let b = scene.spawn(Node2D::new("b"));
        scene.add_child(a, b);

        assert!(scene.remove_child(a, b));
        assert_eq!(scene.get(b).unwrap().base().parent, None);
        assert!(scene.children(a).is_empty());

        // Not present anymore: no-op.
        assert!(!scene.remove_child(a, b));
    }

    #[test]
    fn reparent_detaches_from_previous_parent() {
        let mut scene = Scene::new();
        let a = scene.spawn(Node2D::new("a"));
        let c = scene.spawn(Node2D::new("c"));
        let b = scene.spawn(Node2D::new("b"));
        scene.add_child(a, b);

        assert!(scene.add_child(c, b));
        assert!(scene.children(a).is_empty());
        assert_eq!(scene.children(c), &[b]);
        assert_eq!(scene.get(b).unwrap().base().parent, Some(c));
    }

    #[test]
    fn stale_and_nil_ids_are_no_ops() {
        let mut scene = Scene::new();
        let a = scene.spawn(Node2D::new("a"));
        assert!(!scene.add_child(a, NodeID::nil()));
        assert!(!scene.add_child(NodeID::nil(), a));
        assert!(!scene.add_child(a, a));
        assert!(!scene.remove_child(a, NodeID::from_parts(99, 0)));
        assert!(!scene.despawn(NodeID::from_parts(99, 0)));
    }

    #[test]
    fn frame_3d_cannot_be_a_child() {
        let mut scene = Scene::new();
        let parent = scene.spawn(Node2D::new("parent"));
        let frame = scene.add_frame(Frame3D::new("frame", 64, 64));
        assert!(!scene.add_child(parent, frame));
        assert_eq!(scene.frames(), &[frame]);
    }

    #[test]
    fn despawn_cascades_to_subtree() {
        let mut scene = Scene::new();
        let frame = scene.add_frame(Frame3D::new("frame", 64, 64));
        let panel = scene.spawn(Frame2D::new("panel", 32.0, 32.0));
        let rect = scene.spawn(Rect2D::new("rect", 8.0, 8.0));
        scene.add_child(frame, panel);
        scene.add_child(panel, rect);
        assert_eq!(scene.node_count(), 3);

        assert!(scene.despawn(frame));
        assert_eq!(scene.node_count(), 0);
        assert!(scene.frames().is_empty());
    }

    #[test]
    fn ordered_children_preserved() {
        let mut scene = Scene::new();
        let root = scene.spawn(Node2D::new("root"));
        let ids: Vec<_> = (0..4)
            .map(|i| scene.spawn(Node2D::new(&format!("c{i}"))))
            .collect();
        for id in &ids {
            scene.add_child(root, *id);
        }
        assert_eq!(scene.children(root), ids.as_slice());
    }

    #[test]
    fn json_roundtrip_preserves_tree_and_camera() {
        let mut scene = Scene::new();
        scene.camera_mut().set_position(1.0, 2.0, 3.0);
        let frame = scene.add_frame(Frame3D::new("frame", 200, 150));
        let panel = scene.spawn(Frame2D::new("panel", 100.0, 80.0));
        let mut rect = Rect2D::new("rect", 50.0, 50.0);
        rect.set_color(1.0, 0.0, 0.0, 1.0);
        let rect = scene.spawn(rect);
        scene.add_child(frame, panel);
        scene.add_child(panel, rect);

        let json = scene.to_json().unwrap();
        let restored = Scene::from_json(&json).unwrap();

        assert_eq!(restored.node_count(), 3);
        assert_eq!(restored.frames(), scene.frames());
        assert_eq!(restored.children(frame), &[panel]);
        assert_eq!(restored.children(panel), &[rect]);
        assert_eq!(restored.get(rect).unwrap().base().parent, Some(panel));
        assert_eq!(restored.camera().position, scene.camera().position);

        // Spawning after a reload must not collide with loaded IDs.
        let fresh = {
            let mut restored = restored;
            restored.spawn(Node2D::new("fresh"))
        };
        assert!(![frame, panel, rect].contains(&fresh));
    }

    #[test]
    fn from_json_rejects_dangling_links() {
        let mut scene = Scene::new();
        let a = scene.spawn(Node2D::new("a"));
        let b = scene.spawn(Node2D::new("b"));
        scene.add_child(a, b);
        let json = scene.to_json().unwrap();

        // Drop node b from the serialized form, keeping the link to it.
        let mut data: serde_json::Value = serde_json::from_str(&json).unwrap();
        let nodes = data["nodes"].as_array_mut().unwrap();
        nodes.retain(|entry| entry["id"] != serde_json::json!(b.as_u64()));
        let broken = serde_json::to_string(&data).unwrap();

        assert!(matches!(
            Scene::from_json(&broken),
            Err(SceneError::DanglingLink(_, _))
        ));
    }
}
