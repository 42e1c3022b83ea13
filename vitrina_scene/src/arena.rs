use crate::nodes::SceneNode;
use vitrina_ids::NodeID;

/// Arena storage for scene nodes: `Vec<Option<SceneNode>>` indexed by the
/// ID's low 32 bits. IDs are issued sequentially by the scene and index 0
/// is reserved as nil, so ID value 1 maps to slot 0. Removal leaves a hole;
/// IDs are not reused within a scene's lifetime.
pub struct NodeArena {
    slots: Vec<Option<SceneNode>>,
    live: u32,
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
        }
    }

    fn slot_index(id: NodeID) -> Option<usize> {
        if id.is_nil() {
            return None;
        }
        Some((id.index() as usize) - 1)
    }

    /// Insert a node under a freshly allocated ID. Panics on a nil ID or an
    /// occupied slot; both indicate a bug in the owning scene, not a
    /// caller-recoverable condition.
    pub fn insert(&mut self, id: NodeID, node: SceneNode) {
        let Some(idx) = Self::slot_index(id) else {
            panic!("NodeArena::insert: nil ID");
        };
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        if self.slots[idx].is_some() {
            panic!("NodeArena::insert: slot already occupied (id={id})");
        }
        self.slots[idx] = Some(node);
        self.live += 1;
    }

    #[inline]
    pub fn get(&self, id: NodeID) -> Option<&SceneNode> {
        self.slots.get(Self::slot_index(id)?)?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeID) -> Option<&mut SceneNode> {
        self.slots.get_mut(Self::slot_index(id)?)?.as_mut()
    }

    #[inline]
    pub fn remove(&mut self, id: NodeID) -> Option<SceneNode> {
        let slot = self.slots.get_mut(Self::slot_index(id)?)?;
        let node = slot.take()?;
        self.live -= 1;
        Some(node)
    }

    #[inline]
    pub fn contains(&self, id: NodeID) -> bool {
        self.get(id).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.live as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeID, &SceneNode)> {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.as_ref()
                .map(|node| (NodeID::from_parts((idx + 1) as u32, 0), node))
        })
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::Node2D;

    fn group(name: &str) -> SceneNode {
        SceneNode::Node2D(Node2D::new(name))
    }

    #[test]
    fn insert_get_remove() {
        let mut arena = NodeArena::new();
        let id = NodeID::from_parts(1, 0);
        arena.insert(id, group("a"));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(id).map(|n| n.name()), Some("a"));

        let removed = arena.remove(id);
        assert!(removed.is_some());
        assert!(arena.get(id).is_none());
        assert!(arena.is_empty());
    }

    #[test]
    fn nil_id_is_never_present() {
        let arena = NodeArena::new();
        assert!(arena.get(NodeID::nil()).is_none());
        assert!(!arena.contains(NodeID::nil()));
    }

    #[test]
    fn holes_do_not_shift_other_slots() {
        let mut arena = NodeArena::new();
        let a = NodeID::from_parts(1, 0);
        let b = NodeID::from_parts(2, 0);
        let c = NodeID::from_parts(3, 0);
        arena.insert(a, group("a"));
        arena.insert(b, group("b"));
        arena.insert(c, group("c"));
        arena.remove(b);
        assert_eq!(arena.get(a).map(|n| n.name()), Some("a"));
        assert!(arena.get(b).is_none());
        assert_eq!(arena.get(c).map(|n| n.name()), Some("c"));
        assert_eq!(arena.iter().count(), 2);
    }
}
