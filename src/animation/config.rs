//! Persisted configuration of an animated sprite

use serde::{Deserialize, Serialize};

use crate::scene::BlendMode;

use super::set::ResourceRef;

/// The attribute set saved and restored with an [`super::AnimatedSprite`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatedSpriteConfig {
    /// Draw layer shared by all timeline sprites
    pub layer: i32,
    /// Base draw order; each timeline adds its mainline z index
    pub order_in_layer: i32,
    pub blend_mode: BlendMode,
    /// Playback speed multiplier
    pub speed: f32,
    pub animation_set: ResourceRef,
    /// Name of the animation within the set
    pub animation: String,
}

impl Default for AnimatedSpriteConfig {
    fn default() -> Self {
        Self {
            layer: 0,
            order_in_layer: 0,
            blend_mode: BlendMode::Alpha,
            speed: 1.0,
            animation_set: ResourceRef::default(),
            animation: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnimatedSpriteConfig::default();
        assert_eq!(config.layer, 0);
        assert_eq!(config.order_in_layer, 0);
        assert_eq!(config.blend_mode, BlendMode::Alpha);
        assert_eq!(config.speed, 1.0);
        assert!(config.animation_set.is_empty());
        assert!(config.animation.is_empty());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AnimatedSpriteConfig =
            serde_json::from_str(r#"{ "speed": 2.0, "blend_mode": "add" }"#).unwrap();
        assert_eq!(config.speed, 2.0);
        assert_eq!(config.blend_mode, BlendMode::Add);
        assert_eq!(config.layer, 0);
    }

    #[test]
    fn test_json_round_trip() {
        let config = AnimatedSpriteConfig {
            layer: 2,
            order_in_layer: -1,
            animation_set: ResourceRef::new("hero.json"),
            animation: "walk".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: AnimatedSpriteConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
