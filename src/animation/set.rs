//! Animation sets, sprite resources and the by-name set cache

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::core::{Error, Result};
use crate::core::types::Vec2;

use super::clip::Animation;

/// A sprite image region referenced by timeline keys
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite2D {
    pub name: String,
    /// Texture resource name
    pub texture: String,
    /// Image size in pixels
    pub size: Vec2,
    /// Default normalized pivot, used when a renderable ignores key hot spots
    pub hot_spot: Vec2,
}

impl Sprite2D {
    /// Create a sprite with a centered hot spot
    pub fn new(name: impl Into<String>, texture: impl Into<String>, size: Vec2) -> Self {
        Self {
            name: name.into(),
            texture: texture.into(),
            size,
            hot_spot: Vec2::splat(0.5),
        }
    }
}

/// A named collection of animations sharing one sprite table
#[derive(Clone, Debug, Default)]
pub struct AnimationSet {
    pub name: String,
    sprites: Vec<Arc<Sprite2D>>,
    animations: Vec<Arc<Animation>>,
}

impl AnimationSet {
    /// Create an empty animation set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sprites: Vec::new(),
            animations: Vec::new(),
        }
    }

    /// Add a sprite, returns the shared handle
    pub fn add_sprite(&mut self, sprite: Sprite2D) -> Arc<Sprite2D> {
        let sprite = Arc::new(sprite);
        self.sprites.push(sprite.clone());
        sprite
    }

    /// Add an animation after validating its hierarchy
    pub fn add_animation(&mut self, animation: Animation) -> Result<Arc<Animation>> {
        animation.validate()?;
        let animation = Arc::new(animation);
        self.animations.push(animation.clone());
        Ok(animation)
    }

    /// Find a sprite by name
    pub fn sprite(&self, name: &str) -> Option<&Arc<Sprite2D>> {
        self.sprites.iter().find(|s| s.name == name)
    }

    /// Find an animation by name
    pub fn animation(&self, name: &str) -> Option<&Arc<Animation>> {
        self.animations.iter().find(|a| a.name == name)
    }

    /// Number of animations
    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    /// Names of all animations in definition order
    pub fn animation_names(&self) -> impl Iterator<Item = &str> {
        self.animations.iter().map(|a| a.name.as_str())
    }
}

/// Reference to a resource by type and name, as stored in configs
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResourceRef {
    pub name: String,
}

impl ResourceRef {
    /// Reference a resource by name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// True if the reference names nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// Cache of loaded animation sets keyed by resource name
#[derive(Default)]
pub struct AnimationSetCache {
    sets: HashMap<String, Arc<AnimationSet>>,
}

impl AnimationSetCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an already built set under `name`
    pub fn insert(&mut self, name: impl Into<String>, set: AnimationSet) -> Arc<AnimationSet> {
        let set = Arc::new(set);
        self.sets.insert(name.into(), set.clone());
        set
    }

    /// Load a set document from disk and register it under its path string.
    /// Returns the cached set if that path was loaded before.
    pub fn load(&mut self, path: &Path) -> Result<Arc<AnimationSet>> {
        let key = path.to_string_lossy().into_owned();
        if let Some(set) = self.sets.get(&key) {
            return Ok(set.clone());
        }

        let set = super::loader::load_animation_set(path)?;
        log::info!(
            "Loaded animation set '{}' with {} animations",
            key,
            set.animation_count()
        );
        Ok(self.insert(key, set))
    }

    /// Look up a set by name
    pub fn get(&self, name: &str) -> Option<Arc<AnimationSet>> {
        self.sets.get(name).cloned()
    }

    /// Look up a set by name, failing if it was never loaded
    pub fn require(&self, name: &str) -> Result<Arc<AnimationSet>> {
        self.get(name)
            .ok_or_else(|| Error::AnimationSetNotFound(name.to_string()))
    }

    /// Number of cached sets
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// True if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
