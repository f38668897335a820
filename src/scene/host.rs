//! Capabilities an animated sprite needs from the scene it lives in

use crate::math::{Rect, Transform2D};

use super::node::NodeId;
use super::sprite::StaticSprite;

/// Node and component operations used by [`crate::animation::AnimatedSprite`].
///
/// Operations on a node that no longer exists are ignored.
pub trait SceneHost {
    /// Create an enabled child node under `parent`
    fn create_child(&mut self, parent: NodeId, name: &str) -> NodeId;

    /// Remove a node and its subtree
    fn remove_node(&mut self, node: NodeId);

    /// Attach (or replace) the sprite component of a node
    fn attach_sprite(&mut self, node: NodeId, sprite: StaticSprite);

    /// Mutable access to a node's sprite component
    fn sprite_mut(&mut self, node: NodeId) -> Option<&mut StaticSprite>;

    /// Whether the node itself is enabled
    fn is_enabled(&self, node: NodeId) -> bool;

    fn set_enabled(&mut self, node: NodeId, enabled: bool);

    /// Set the node's transform relative to its parent
    fn set_transform(&mut self, node: NodeId, transform: Transform2D);

    /// World transform of a node, identity for unknown nodes
    fn world_transform(&self, node: NodeId) -> Transform2D;

    /// World-space bounds of a node's sprite, `None` without a sprite
    fn sprite_world_bounds(&self, node: NodeId) -> Option<Rect>;

    /// Request a redraw of a drawable node
    fn mark_for_update(&mut self, node: NodeId);
}
