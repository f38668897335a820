//! Scene graph: a node hierarchy stored in a `hecs` world.
//!
//! Every node is an entity carrying a [`SceneNode`]; drawable nodes also carry
//! a [`StaticSprite`]. World transforms are derived on demand by walking the
//! parent chain. `draw_list()` collects the visible sprites in draw order.

use crate::math::{Rect, Transform2D};

use super::host::SceneHost;
use super::node::{NodeId, SceneNode};
use super::sprite::StaticSprite;

/// One visible sprite resolved for drawing
#[derive(Clone, Debug)]
pub struct DrawItem {
    pub node: NodeId,
    pub sprite: StaticSprite,
    pub world_transform: Transform2D,
}

/// CPU-side scene graph of 2D nodes.
pub struct SceneGraph {
    world: hecs::World,
    root: NodeId,
    redraw: Vec<NodeId>,
    dirty: bool,
}

impl SceneGraph {
    /// Create a new scene graph with a root node.
    pub fn new() -> Self {
        let mut world = hecs::World::new();
        let root = NodeId(world.spawn((SceneNode::new("root"),)));

        Self {
            world,
            root,
            redraw: Vec::new(),
            dirty: true,
        }
    }

    /// Get the root node ID.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Add a child node under `parent`. Returns the new node's ID.
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        let mut node = SceneNode::new(name);
        node.parent = Some(parent);
        let id = NodeId(self.world.spawn((node,)));

        // Register as child of parent
        if let Ok(parent_node) = self.world.query_one_mut::<&mut SceneNode>(parent.0) {
            parent_node.children.push(id);
        }

        self.dirty = true;
        id
    }

    /// Remove a node and its entire subtree. Cannot remove the root.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }

        // Collect subtree IDs (BFS)
        let mut to_remove = vec![id];
        let mut i = 0;
        while i < to_remove.len() {
            let current = to_remove[i];
            if let Ok(node) = self.world.get::<&SceneNode>(current.0) {
                to_remove.extend_from_slice(&node.children);
            }
            i += 1;
        }

        // Detach from parent
        let parent = self.world.get::<&SceneNode>(id.0).ok().and_then(|node| node.parent);
        if let Some(parent_id) = parent {
            if let Ok(parent) = self.world.query_one_mut::<&mut SceneNode>(parent_id.0) {
                parent.children.retain(|c| *c != id);
            }
        }

        // Remove all nodes in subtree
        for nid in to_remove {
            let _ = self.world.despawn(nid.0);
        }

        self.redraw.retain(|n| self.world.contains(n.0));
        self.dirty = true;
    }

    /// Whether a node exists
    pub fn contains(&self, id: NodeId) -> bool {
        self.world.contains(id.0)
    }

    /// Get a copy of a node's hierarchy component.
    pub fn get(&self, id: NodeId) -> Option<SceneNode> {
        self.world.get::<&SceneNode>(id.0).ok().map(|node| (*node).clone())
    }

    /// Get a copy of a node's sprite component.
    pub fn sprite(&self, id: NodeId) -> Option<StaticSprite> {
        self.world.get::<&StaticSprite>(id.0).ok().map(|sprite| (*sprite).clone())
    }

    /// Iterate over the children of a node.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.world
            .get::<&SceneNode>(id.0)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// True if the node and all of its ancestors are enabled
    pub fn is_enabled_effective(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Ok(node) = self.world.get::<&SceneNode>(node_id.0) else {
                return false;
            };
            if !node.enabled {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.world.len() as usize
    }

    /// Nodes that requested a redraw since the last call
    pub fn take_redraw_requests(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.redraw)
    }

    /// Whether anything changed since the last `draw_list()`
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Collect every effectively enabled sprite, sorted by layer then order
    /// in layer.
    pub fn draw_list(&mut self) -> Vec<DrawItem> {
        let drawable: Vec<(NodeId, StaticSprite)> = self
            .world
            .query::<&StaticSprite>()
            .iter()
            .map(|(entity, sprite)| (NodeId(entity), sprite.clone()))
            .collect();

        let mut out: Vec<DrawItem> = drawable
            .into_iter()
            .filter(|(node, sprite)| sprite.sprite.is_some() && self.is_enabled_effective(*node))
            .map(|(node, sprite)| DrawItem {
                node,
                world_transform: self.world_transform(node),
                sprite,
            })
            .collect();

        out.sort_by_key(|item| (item.sprite.layer, item.sprite.order_in_layer));
        self.dirty = false;
        out
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneHost for SceneGraph {
    fn create_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.add_child(parent, name)
    }

    fn remove_node(&mut self, node: NodeId) {
        self.remove(node);
    }

    fn attach_sprite(&mut self, node: NodeId, sprite: StaticSprite) {
        if self.world.insert_one(node.0, sprite).is_ok() {
            self.dirty = true;
        }
    }

    fn sprite_mut(&mut self, node: NodeId) -> Option<&mut StaticSprite> {
        self.dirty = true;
        self.world.query_one_mut::<&mut StaticSprite>(node.0).ok()
    }

    fn is_enabled(&self, node: NodeId) -> bool {
        self.world
            .get::<&SceneNode>(node.0)
            .map(|n| n.enabled)
            .unwrap_or(false)
    }

    fn set_enabled(&mut self, node: NodeId, enabled: bool) {
        if let Ok(n) = self.world.query_one_mut::<&mut SceneNode>(node.0) {
            n.enabled = enabled;
            self.dirty = true;
        }
    }

    fn set_transform(&mut self, node: NodeId, transform: Transform2D) {
        if let Ok(n) = self.world.query_one_mut::<&mut SceneNode>(node.0) {
            n.local_transform = transform;
            self.dirty = true;
        }
    }

    fn world_transform(&self, node: NodeId) -> Transform2D {
        let mut world = Transform2D::IDENTITY;
        let mut current = Some(node);
        let mut depth = 0;
        while let Some(id) = current {
            let Ok(n) = self.world.get::<&SceneNode>(id.0) else {
                break;
            };
            world = n.local_transform * world;
            current = n.parent;

            depth += 1;
            if depth > self.node_count() {
                break;
            }
        }
        world
    }

    fn sprite_world_bounds(&self, node: NodeId) -> Option<Rect> {
        let local = self.world.get::<&StaticSprite>(node.0).ok()?.local_bounds();
        Some(local.transformed(&self.world_transform(node).to_affine()))
    }

    fn mark_for_update(&mut self, node: NodeId) {
        if !self.redraw.contains(&node) {
            self.redraw.push(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::animation::Sprite2D;
    use crate::core::types::Vec2;

    #[test]
    fn test_new_scene_graph() {
        let graph = SceneGraph::new();
        assert_eq!(graph.node_count(), 1); // root only
        assert_eq!(graph.get(graph.root()).unwrap().name, "root");
    }

    #[test]
    fn test_add_multiple_children() {
        let mut graph = SceneGraph::new();
        let root = graph.root();

        let a = graph.add_child(root, "a");
        let b = graph.add_child(root, "b");
        let c = graph.add_child(a, "c");

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.children(root).len(), 2);
        assert_eq!(graph.children(a), vec![c]);
        assert!(graph.children(b).is_empty());
        assert_eq!(graph.get(c).unwrap().parent, Some(a));
        assert_eq!(graph.get(b).unwrap().name, "b");
    }

    #[test]
    fn test_remove_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let parent = graph.add_child(root, "parent");
        let child1 = graph.add_child(parent, "c1");
        let child2 = graph.add_child(parent, "c2");
        let _grandchild = graph.add_child(child1, "gc");

        assert_eq!(graph.node_count(), 5);

        graph.remove(parent);

        assert_eq!(graph.node_count(), 1); // only root
        assert!(graph.get(parent).is_none());
        assert!(!graph.contains(child1));
        assert!(!graph.contains(child2));
        assert!(graph.children(root).is_empty());
    }

    #[test]
    fn test_cannot_remove_root() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        graph.remove(root);
        assert_eq!(graph.node_count(), 1); // root survives
    }

    #[test]
    fn test_world_transform_composes_parents() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.add_child(root, "a");
        let b = graph.add_child(a, "b");

        graph.set_transform(a, Transform2D::new(Vec2::new(1.0, 0.0), 90.0, Vec2::ONE));
        graph.set_transform(b, Transform2D::from_position(Vec2::new(2.0, 0.0)));

        let world = graph.world_transform(b);
        assert!(world.position.abs_diff_eq(Vec2::new(1.0, 2.0), 1e-5));
        assert!((world.angle - 90.0).abs() < 1e-5);
    }

    #[test]
    fn test_enabled_effective() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.add_child(root, "a");
        let b = graph.add_child(a, "b");

        assert!(graph.is_enabled_effective(b));
        graph.set_enabled(a, false);
        assert!(graph.is_enabled(b));
        assert!(!graph.is_enabled_effective(b));
    }

    #[test]
    fn test_sprite_component_and_bounds() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let node = graph.add_child(root, "sprite");
        assert!(graph.sprite_world_bounds(node).is_none());

        let mut sprite = StaticSprite::new();
        sprite.sprite = Some(Arc::new(Sprite2D::new("s", "s.png", Vec2::new(100.0, 100.0))));
        graph.attach_sprite(node, sprite);
        graph.set_transform(node, Transform2D::from_position(Vec2::new(5.0, 0.0)));

        let bounds = graph.sprite_world_bounds(node).unwrap();
        assert!(bounds.center().abs_diff_eq(Vec2::new(5.0, 0.0), 1e-5));
        assert!(bounds.size().abs_diff_eq(Vec2::ONE, 1e-5));

        graph.sprite_mut(node).unwrap().layer = 3;
        assert_eq!(graph.sprite(node).unwrap().layer, 3);
    }

    #[test]
    fn test_draw_list_order_and_visibility() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let image = Arc::new(Sprite2D::new("s", "s.png", Vec2::splat(10.0)));

        let mut nodes = Vec::new();
        for (name, order) in [("back", 0), ("front", 5), ("mid", 2)] {
            let node = graph.add_child(root, name);
            let mut sprite = StaticSprite::new();
            sprite.sprite = Some(image.clone());
            sprite.order_in_layer = order;
            graph.attach_sprite(node, sprite);
            nodes.push(node);
        }
        graph.set_enabled(nodes[2], false);

        let list = graph.draw_list();
        let order: Vec<NodeId> = list.iter().map(|item| item.node).collect();
        assert_eq!(order, vec![nodes[0], nodes[1]]);
        assert!(!graph.is_dirty());
    }

    #[test]
    fn test_redraw_requests() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        graph.mark_for_update(root);
        graph.mark_for_update(root);
        assert_eq!(graph.take_redraw_requests(), vec![root]);
        assert!(graph.take_redraw_requests().is_empty());
    }
}
