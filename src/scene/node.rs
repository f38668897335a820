//! Scene graph node types
//!
//! Node handles and the per-node component stored in the ECS world.

use crate::math::Transform2D;

/// Unique identifier for a scene graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub hecs::Entity);

impl NodeId {
    /// Stable numeric form, used in logs
    pub fn to_bits(self) -> u64 {
        self.0.to_bits().get()
    }
}

/// Hierarchy and transform component carried by every node entity.
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Transform relative to the parent node
    pub local_transform: Transform2D,
    pub enabled: bool,
}

impl SceneNode {
    /// Create a new enabled node with an identity transform.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            local_transform: Transform2D::IDENTITY,
            enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_node_new() {
        let node = SceneNode::new("root");
        assert_eq!(node.name, "root");
        assert!(node.parent.is_none());
        assert!(node.children.is_empty());
        assert!(node.enabled);
        assert_eq!(node.local_transform, Transform2D::IDENTITY);
    }

    #[test]
    fn test_node_id_equality() {
        let mut world = hecs::World::new();
        let a = NodeId(world.spawn(()));
        let b = NodeId(world.spawn(()));
        assert_eq!(a, a);
        assert_ne!(a, b);
        assert_ne!(a.to_bits(), b.to_bits());
    }
}
