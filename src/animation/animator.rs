//! Animated sprite component
//!
//! An [`AnimatedSprite`] binds one [`Animation`] and instantiates a child node
//! with a [`StaticSprite`] for every sprite timeline under its owner node.
//! Each frame step it samples every timeline, resolves the timeline
//! hierarchy into world poses and pushes pose, visibility and draw order
//! from the active mainline key onto those child nodes.

use std::sync::Arc;

use crate::core::types::Vec4;
use crate::math::{Rect, Transform2D};
use crate::scene::{BlendMode, FrameStepBus, NodeId, SceneHost, StaticSprite};

use super::clip::Animation;
use super::config::AnimatedSpriteConfig;
use super::hierarchy::TransformHierarchy;
use super::set::{AnimationSet, AnimationSetCache, ResourceRef};

/// Plays a skeletal 2D animation through child sprite nodes
#[derive(Debug)]
pub struct AnimatedSprite {
    node: Option<NodeId>,
    enabled: bool,
    layer: i32,
    order_in_layer: i32,
    blend_mode: BlendMode,
    speed: f32,
    /// Normalized play time of the bound animation
    current_time: f32,
    animation_set: Option<Arc<AnimationSet>>,
    animation_set_ref: ResourceRef,
    animation_name: String,
    animation: Option<Arc<Animation>>,
    /// One slot per timeline; `Some` only for timelines with a renderable
    timeline_nodes: Vec<Option<NodeId>>,
    hierarchy: TransformHierarchy,
    bounding_box: Rect,
    world_bounding_box: Rect,
    bounds_dirty: bool,
    network_dirty: bool,
}

impl Default for AnimatedSprite {
    fn default() -> Self {
        Self {
            node: None,
            enabled: true,
            layer: 0,
            order_in_layer: 0,
            blend_mode: BlendMode::Alpha,
            speed: 1.0,
            current_time: 0.0,
            animation_set: None,
            animation_set_ref: ResourceRef::default(),
            animation_name: String::new(),
            animation: None,
            timeline_nodes: Vec::new(),
            hierarchy: TransformHierarchy::new(),
            bounding_box: Rect::EMPTY,
            world_bounding_box: Rect::EMPTY,
            bounds_dirty: true,
            network_dirty: false,
        }
    }
}

impl AnimatedSprite {
    /// Create an unattached, enabled component with default attributes
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to (or detach from) an owner node.
    ///
    /// Subscribes the owner to frame steps when the component is enabled. A
    /// bound animation is rebuilt so its timeline nodes hang under the new
    /// owner.
    pub fn on_node_set(
        &mut self,
        node: Option<NodeId>,
        host: &mut dyn SceneHost,
        bus: &mut FrameStepBus,
    ) {
        let moved = self.node != node;
        if let Some(old) = self.node.filter(|_| moved) {
            bus.unsubscribe(old);
        }

        let rebind = if moved { self.animation.clone() } else { None };
        if rebind.is_some() {
            self.set_animation(None, host);
        }

        self.node = node;

        if let Some(node) = node {
            if self.enabled {
                bus.subscribe(node);
            }
        }

        if let Some(animation) = rebind {
            log::debug!("Rebuilding animation '{}' for a new owner", animation.name);
            self.set_animation(Some(animation), host);
        }
    }

    /// Enable or disable frame stepping
    pub fn set_enabled(&mut self, enabled: bool, bus: &mut FrameStepBus) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;

        if let Some(node) = self.node {
            if enabled {
                bus.subscribe(node);
            } else {
                bus.unsubscribe(node);
            }
        }
    }

    /// Unbind, destroy the timeline nodes and leave the frame step
    pub fn detach(&mut self, host: &mut dyn SceneHost, bus: &mut FrameStepBus) {
        self.set_animation(None, host);
        self.on_node_set(None, host, bus);
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set the draw layer of every timeline sprite
    pub fn set_layer(&mut self, layer: i32, host: &mut dyn SceneHost) {
        if layer == self.layer {
            return;
        }
        self.layer = layer;

        for node in self.timeline_nodes.iter().flatten() {
            if let Some(sprite) = host.sprite_mut(*node) {
                sprite.layer = layer;
            }
        }
    }

    pub fn layer(&self) -> i32 {
        self.layer
    }

    /// Base draw order; applied on the next evaluation
    pub fn set_order_in_layer(&mut self, order_in_layer: i32) {
        self.order_in_layer = order_in_layer;
    }

    pub fn order_in_layer(&self) -> i32 {
        self.order_in_layer
    }

    /// Set the blend mode of every timeline sprite
    pub fn set_blend_mode(&mut self, blend_mode: BlendMode, host: &mut dyn SceneHost) {
        if blend_mode == self.blend_mode {
            return;
        }
        self.blend_mode = blend_mode;

        for node in self.timeline_nodes.iter().flatten() {
            if let Some(sprite) = host.sprite_mut(*node) {
                sprite.blend_mode = blend_mode;
            }
        }
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// Set the playback speed multiplier
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
        self.network_dirty = true;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Normalized play time of the bound animation
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// Bind `name` from `set`, remembering both
    pub fn set_animation_by_name(
        &mut self,
        set: Option<Arc<AnimationSet>>,
        name: &str,
        host: &mut dyn SceneHost,
    ) {
        self.animation_set_ref = set
            .as_ref()
            .map(|s| ResourceRef::new(s.name.clone()))
            .unwrap_or_default();
        self.animation_set = set;
        self.animation_name = name.to_string();

        let animation = self.resolve_animation();
        self.set_animation(animation, host);
    }

    /// Swap the animation set and rebind the stored animation name from it
    pub fn set_animation_set(&mut self, set: Option<Arc<AnimationSet>>, host: &mut dyn SceneHost) {
        let same = match (&self.animation_set, &set) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if same {
            return;
        }

        self.animation_set_ref = set
            .as_ref()
            .map(|s| ResourceRef::new(s.name.clone()))
            .unwrap_or_default();
        self.animation_set = set;

        let animation = self.resolve_animation();
        self.set_animation(animation, host);
    }

    pub fn animation_set(&self) -> Option<&Arc<AnimationSet>> {
        self.animation_set.as_ref()
    }

    /// Store the animation name and bind it if a set is present
    pub fn set_animation_name(&mut self, name: &str, host: &mut dyn SceneHost) {
        self.animation_name = name.to_string();

        if self.animation_set.is_some() {
            let animation = self.resolve_animation();
            self.set_animation(animation, host);
        }
    }

    /// Name of the requested animation
    pub fn animation_name(&self) -> &str {
        &self.animation_name
    }

    /// Bind the animation set registered in `cache` under `reference`.
    /// An unknown name unbinds.
    pub fn set_animation_set_attr(
        &mut self,
        reference: &ResourceRef,
        cache: &AnimationSetCache,
        host: &mut dyn SceneHost,
    ) {
        let set = lookup_set(reference, cache);
        let found = set.is_some();
        self.set_animation_set(set, host);
        self.animation_set_ref = if found {
            reference.clone()
        } else {
            ResourceRef::default()
        };
    }

    /// Reference of the bound animation set
    pub fn animation_set_attr(&self) -> ResourceRef {
        self.animation_set_ref.clone()
    }

    fn resolve_animation(&self) -> Option<Arc<Animation>> {
        let set = self.animation_set.as_ref()?;
        let animation = set.animation(&self.animation_name).cloned();
        if animation.is_none() && !self.animation_name.is_empty() {
            log::warn!(
                "Animation '{}' not found in set '{}'",
                self.animation_name,
                set.name
            );
        }
        animation
    }

    /// Bind an animation.
    ///
    /// Binding the already bound animation only rewinds it. Otherwise every
    /// timeline node created for the previous animation is removed before
    /// the new ones are created, and the new animation is evaluated at time
    /// zero. `None`, or an animation with a broken parent hierarchy, leaves
    /// the component unbound.
    pub fn set_animation(&mut self, animation: Option<Arc<Animation>>, host: &mut dyn SceneHost) {
        let same = match (&self.animation, &animation) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if same {
            self.current_time = 0.0;
            return;
        }

        for node in self.timeline_nodes.drain(..).flatten() {
            host.remove_node(node);
        }
        self.hierarchy.clear();
        self.animation = None;
        self.current_time = 0.0;
        self.bounds_dirty = true;
        self.network_dirty = true;

        let Some(animation) = animation else {
            log::debug!("Animated sprite unbound");
            return;
        };

        if let Err(err) = animation.validate() {
            log::error!("Cannot bind animation '{}': {}", animation.name, err);
            return;
        }

        if self.node.is_none() {
            log::warn!(
                "Animation '{}' bound without an owner node, sprites are not created",
                animation.name
            );
        }

        self.timeline_nodes = animation
            .timelines
            .iter()
            .map(|timeline| {
                let owner = self.node.filter(|_| timeline.kind.requires_renderable())?;
                let child = host.create_child(owner, &timeline.name);
                host.attach_sprite(
                    child,
                    StaticSprite::new()
                        .with_layer(self.layer)
                        .with_blend_mode(self.blend_mode)
                        .with_use_hot_spot(true),
                );
                Some(child)
            })
            .collect();
        self.hierarchy = TransformHierarchy::from_parents(animation.timelines.iter().map(|t| t.parent));

        for timeline in animation.timelines.iter().filter(|t| t.keys.is_empty()) {
            log::debug!("Timeline '{}' of '{}' has no keys", timeline.name, animation.name);
        }

        log::debug!(
            "Bound animation '{}': {} timelines, {} sprite nodes",
            animation.name,
            animation.timeline_count(),
            self.timeline_nodes.iter().flatten().count()
        );

        self.animation_name = animation.name.clone();
        self.animation = Some(animation);
        self.update_animation(0.0, host);
    }

    /// The bound animation
    pub fn animation(&self) -> Option<&Arc<Animation>> {
        self.animation.as_ref()
    }

    /// Child node created for a timeline, `None` for non-sprite timelines
    pub fn timeline_node(&self, index: usize) -> Option<NodeId> {
        self.timeline_nodes.get(index).copied().flatten()
    }

    /// Number of timeline slots, equal to the bound animation's timeline count
    pub fn timeline_count(&self) -> usize {
        self.timeline_nodes.len()
    }

    /// Last sampled local pose of a timeline
    pub fn timeline_local_transform(&self, index: usize) -> Option<Transform2D> {
        self.hierarchy.get(index).map(|info| info.local)
    }

    /// Last resolved world pose of a timeline, relative to the owner node
    pub fn timeline_world_transform(&self, index: usize) -> Option<Transform2D> {
        self.hierarchy.get(index).map(|info| info.world)
    }

    /// Advance play time and push the resulting pose to the timeline nodes
    pub fn update_animation(&mut self, time_step: f32, host: &mut dyn SceneHost) {
        let Some(animation) = self.animation.clone() else {
            return;
        };

        let time = animation.normalize_time(self.current_time + time_step * self.speed);
        self.current_time = time;

        self.hierarchy.invalidate();

        // Sample local poses
        for (index, timeline) in animation.timelines.iter().enumerate() {
            let Some(sample) = timeline.sample(time) else {
                continue;
            };

            self.hierarchy.set_local(index, sample.transform);

            if let Some(node) = self.timeline_nodes[index] {
                if let Some(sprite) = host.sprite_mut(node) {
                    sprite.sprite = sample.sprite;
                    sprite.hot_spot = sample.hot_spot;
                    sprite.color = Vec4::new(1.0, 1.0, 1.0, sample.alpha);
                }
            }
        }

        self.hierarchy.resolve_all();

        // Visibility, pose and draw order from the active mainline key
        let mainline_key = animation.mainline_key_at(time);
        for (index, node) in self.timeline_nodes.iter().enumerate() {
            let Some(node) = *node else {
                continue;
            };

            match mainline_key.and_then(|key| key.reference(index)) {
                None => {
                    if host.is_enabled(node) {
                        host.set_enabled(node, false);
                    }
                }
                Some(reference) => {
                    if !host.is_enabled(node) {
                        host.set_enabled(node, true);
                    }

                    let world = self
                        .hierarchy
                        .get(index)
                        .map(|info| info.world)
                        .unwrap_or_default();
                    host.set_transform(node, world);

                    if let Some(sprite) = host.sprite_mut(node) {
                        sprite.order_in_layer = self.order_in_layer + reference.z_index;
                    }
                }
            }
        }

        log::trace!("Animation '{}' at {:.3}s", animation.name, time);

        self.bounds_dirty = true;
        if let Some(owner) = self.node {
            host.mark_for_update(owner);
        }
    }

    /// Recompute bounds from the timeline sprites' world bounds
    pub fn on_world_bounding_box_update(&mut self, host: &dyn SceneHost) {
        self.world_bounding_box = Rect::EMPTY;

        for node in self.timeline_nodes.iter().flatten() {
            if let Some(bounds) = host.sprite_world_bounds(*node) {
                self.world_bounding_box = self.world_bounding_box.merged(&bounds);
            }
        }

        self.bounding_box = match self.node {
            Some(owner) => {
                let inverse = host.world_transform(owner).to_affine().inverse();
                self.world_bounding_box.transformed(&inverse)
            }
            None => self.world_bounding_box,
        };
        self.bounds_dirty = false;
    }

    /// World-space bounds of all timeline sprites, recomputed when stale
    pub fn world_bounding_box(&mut self, host: &dyn SceneHost) -> Rect {
        if self.bounds_dirty {
            self.on_world_bounding_box_update(host);
        }
        self.world_bounding_box
    }

    /// Bounds in the owner node's space, recomputed when stale
    pub fn bounding_box(&mut self, host: &dyn SceneHost) -> Rect {
        if self.bounds_dirty {
            self.on_world_bounding_box_update(host);
        }
        self.bounding_box
    }

    /// Returns true once after any persisted attribute changed
    pub fn take_network_update(&mut self) -> bool {
        std::mem::take(&mut self.network_dirty)
    }

    /// Snapshot of the persisted attributes
    pub fn config(&self) -> AnimatedSpriteConfig {
        AnimatedSpriteConfig {
            layer: self.layer,
            order_in_layer: self.order_in_layer,
            blend_mode: self.blend_mode,
            speed: self.speed,
            animation_set: self.animation_set_attr(),
            animation: self.animation_name.clone(),
        }
    }

    /// Restore persisted attributes, resolving the set through `cache`
    pub fn apply_config(
        &mut self,
        config: &AnimatedSpriteConfig,
        cache: &AnimationSetCache,
        host: &mut dyn SceneHost,
    ) {
        self.set_layer(config.layer, host);
        self.set_order_in_layer(config.order_in_layer);
        self.set_blend_mode(config.blend_mode, host);
        self.set_speed(config.speed);

        let set = lookup_set(&config.animation_set, cache);
        let found = set.is_some();
        self.set_animation_by_name(set, &config.animation, host);
        if found {
            self.animation_set_ref = config.animation_set.clone();
        }
    }
}

fn lookup_set(reference: &ResourceRef, cache: &AnimationSetCache) -> Option<Arc<AnimationSet>> {
    if reference.is_empty() {
        return None;
    }

    match cache.require(&reference.name) {
        Ok(set) => Some(set),
        Err(err) => {
            log::warn!("{}", err);
            None
        }
    }
}
