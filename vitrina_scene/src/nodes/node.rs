use serde::{Deserialize, Serialize};
use vitrina_ids::NodeID;

fn default_visible() -> bool {
    true
}

fn is_default_visible(v: &bool) -> bool {
    *v == default_visible()
}

/// Base data shared by every node: identity, tree links, visibility.
///
/// `id` is assigned by the scene on spawn and restored on load; `parent`
/// and `children` are maintained exclusively through the `Scene` API so a
/// node is never linked from two parents at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Node {
    #[serde(skip)]
    pub id: NodeID,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeID>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeID>,

    #[serde(default = "default_visible", skip_serializing_if = "is_default_visible")]
    pub visible: bool,
}

impl Node {
    pub fn new(name: &str) -> Self {
        Self {
            id: NodeID::nil(),
            name: name.to_owned(),
            parent: None,
            children: Vec::new(),
            visible: true,
        }
    }
}
