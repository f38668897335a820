//! Scene manager: owns the graph, the animated sprites and the frame step

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::animation::{AnimatedSprite, AnimatedSpriteConfig, AnimationSet, AnimationSetCache};
use crate::core::Result;

use super::events::FrameStepBus;
use super::graph::SceneGraph;
use super::node::NodeId;

/// Drives every animated sprite in one scene graph.
pub struct SceneManager {
    scene_graph: SceneGraph,
    bus: FrameStepBus,
    animated_sprites: HashMap<NodeId, AnimatedSprite>,
    cache: AnimationSetCache,
    frame: u64,
}

impl SceneManager {
    /// Create an empty scene
    pub fn new() -> Self {
        Self {
            scene_graph: SceneGraph::new(),
            bus: FrameStepBus::new(),
            animated_sprites: HashMap::new(),
            cache: AnimationSetCache::new(),
            frame: 0,
        }
    }

    /// Load an animation set document into the resource cache
    pub fn load_animation_set(&mut self, path: &Path) -> Result<Arc<AnimationSet>> {
        self.cache.load(path)
    }

    /// Create a node under `parent` carrying a new animated sprite
    pub fn add_animated_sprite(&mut self, parent: NodeId, name: &str) -> NodeId {
        let node = self.scene_graph.add_child(parent, name);
        let mut sprite = AnimatedSprite::new();
        sprite.on_node_set(Some(node), &mut self.scene_graph, &mut self.bus);
        self.animated_sprites.insert(node, sprite);

        log::debug!("Added animated sprite '{}' (node {})", name, node.to_bits());
        node
    }

    /// Remove an animated sprite together with its node
    pub fn remove_animated_sprite(&mut self, node: NodeId) {
        if let Some(mut sprite) = self.animated_sprites.remove(&node) {
            sprite.detach(&mut self.scene_graph, &mut self.bus);
        }
        self.scene_graph.remove(node);
    }

    /// Get the animated sprite attached to `node`
    pub fn animated_sprite(&self, node: NodeId) -> Option<&AnimatedSprite> {
        self.animated_sprites.get(&node)
    }

    /// Mutable access to an animated sprite and the graph it drives
    pub fn animated_sprite_mut(&mut self, node: NodeId) -> Option<(&mut AnimatedSprite, &mut SceneGraph)> {
        let sprite = self.animated_sprites.get_mut(&node)?;
        Some((sprite, &mut self.scene_graph))
    }

    /// Enable or disable an animated sprite's frame stepping
    pub fn set_enabled(&mut self, node: NodeId, enabled: bool) {
        if let Some(sprite) = self.animated_sprites.get_mut(&node) {
            sprite.set_enabled(enabled, &mut self.bus);
        }
    }

    /// Restore an animated sprite's persisted attributes
    pub fn apply_config(&mut self, node: NodeId, config: &AnimatedSpriteConfig) {
        if let Some(sprite) = self.animated_sprites.get_mut(&node) {
            sprite.apply_config(config, &self.cache, &mut self.scene_graph);
        }
    }

    /// Step every subscribed animated sprite whose owner chain is enabled
    pub fn post_update(&mut self, time_step: f32) {
        self.frame += 1;

        let mut stepped = 0;
        for node in self.bus.subscribers() {
            if !self.scene_graph.is_enabled_effective(*node) {
                continue;
            }
            if let Some(sprite) = self.animated_sprites.get_mut(node) {
                sprite.update_animation(time_step, &mut self.scene_graph);
                stepped += 1;
            }
        }

        log::trace!("Frame {}: stepped {} animated sprites", self.frame, stepped);
    }

    /// Get a reference to the scene graph.
    pub fn scene_graph(&self) -> &SceneGraph {
        &self.scene_graph
    }

    /// Get a mutable reference to the scene graph.
    pub fn scene_graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene_graph
    }

    pub fn cache(&self) -> &AnimationSetCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut AnimationSetCache {
        &mut self.cache
    }

    /// Number of post updates delivered
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn animated_sprite_count(&self) -> usize {
        self.animated_sprites.len()
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Animation, MainlineKey, ResourceRef, Sprite2D, Timeline, TimelineKey, TimelineKind};
    use crate::core::types::Vec2;
    use crate::math::Transform2D;
    use crate::scene::SceneHost;

    fn walk_set() -> AnimationSet {
        let body = Arc::new(Sprite2D::new("body", "body.png", Vec2::splat(100.0)));
        let mut anim = Animation::new("walk", 1.0, true);
        anim.add_timeline(
            Timeline::new("body", TimelineKind::Sprite, None)
                .with_key(TimelineKey::new(0.0, Transform2D::IDENTITY).with_sprite(body.clone()))
                .with_key(
                    TimelineKey::new(1.0, Transform2D::from_position(Vec2::new(1.0, 0.0)))
                        .with_sprite(body),
                ),
        );
        anim.add_mainline_key(MainlineKey::new(0.0).with_reference(0, 0));

        let mut set = AnimationSet::new("walker");
        set.add_animation(anim).unwrap();
        set
    }

    fn walking_scene() -> (SceneManager, NodeId) {
        let mut manager = SceneManager::new();
        manager.cache_mut().insert("walker.json", walk_set());
        let root = manager.scene_graph().root();
        let node = manager.add_animated_sprite(root, "walker");
        manager.apply_config(
            node,
            &AnimatedSpriteConfig {
                animation_set: ResourceRef::new("walker.json"),
                animation: "walk".to_string(),
                ..Default::default()
            },
        );
        (manager, node)
    }

    #[test]
    fn test_post_update_steps_subscribers_once() {
        let (mut manager, node) = walking_scene();
        manager.post_update(0.25);
        manager.post_update(0.25);

        let sprite = manager.animated_sprite(node).unwrap();
        assert!((sprite.current_time() - 0.5).abs() < 1e-5);
        assert_eq!(manager.frame(), 2);
    }

    #[test]
    fn test_disabled_sprite_is_not_stepped() {
        let (mut manager, node) = walking_scene();
        manager.set_enabled(node, false);
        manager.post_update(0.25);
        assert_eq!(manager.animated_sprite(node).unwrap().current_time(), 0.0);

        manager.set_enabled(node, true);
        manager.post_update(0.25);
        assert!((manager.animated_sprite(node).unwrap().current_time() - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_disabled_owner_chain_is_not_stepped() {
        let mut manager = SceneManager::new();
        manager.cache_mut().insert("walker.json", walk_set());
        let root = manager.scene_graph().root();
        let parent = manager.scene_graph_mut().add_child(root, "parent");
        let node = manager.add_animated_sprite(parent, "walker");
        manager.apply_config(
            node,
            &AnimatedSpriteConfig {
                animation_set: ResourceRef::new("walker.json"),
                animation: "walk".to_string(),
                ..Default::default()
            },
        );

        manager.scene_graph_mut().set_enabled(parent, false);
        manager.post_update(0.25);
        assert_eq!(manager.animated_sprite(node).unwrap().current_time(), 0.0);

        manager.scene_graph_mut().set_enabled(parent, true);
        manager.post_update(0.25);
        assert!((manager.animated_sprite(node).unwrap().current_time() - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_draw_list_follows_animation() {
        let (mut manager, _node) = walking_scene();
        manager.post_update(0.5);

        let list = manager.scene_graph_mut().draw_list();
        assert_eq!(list.len(), 1);
        assert!(list[0].world_transform.position.abs_diff_eq(Vec2::new(0.5, 0.0), 1e-5));
        assert_eq!(list[0].sprite.sprite.as_ref().unwrap().name, "body");
    }

    #[test]
    fn test_remove_animated_sprite() {
        let (mut manager, node) = walking_scene();
        assert_eq!(manager.scene_graph().node_count(), 3);

        manager.remove_animated_sprite(node);
        assert_eq!(manager.animated_sprite_count(), 0);
        assert_eq!(manager.scene_graph().node_count(), 1);

        // Stepping after removal is harmless
        manager.post_update(0.1);
    }

    #[test]
    fn test_animated_sprite_mut() {
        let (mut manager, node) = walking_scene();
        let (sprite, graph) = manager.animated_sprite_mut(node).unwrap();
        sprite.set_layer(3, graph);
        assert_eq!(manager.animated_sprite(node).unwrap().layer(), 3);
    }
}
