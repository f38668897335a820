//! Renderable sprite leaf component

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::animation::Sprite2D;
use crate::core::types::{Vec2, Vec4};
use crate::math::Rect;

/// World units per sprite pixel
pub const PIXEL_SIZE: f32 = 0.01;

/// How a sprite is blended with what is already drawn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    Replace,
    Add,
    Multiply,
    #[default]
    Alpha,
    AddAlpha,
    PremulAlpha,
    InvDestAlpha,
    Subtract,
    SubtractAlpha,
}

impl BlendMode {
    /// Parse a blend mode by its lowercase name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "replace" => Some(Self::Replace),
            "add" => Some(Self::Add),
            "multiply" => Some(Self::Multiply),
            "alpha" => Some(Self::Alpha),
            "addalpha" => Some(Self::AddAlpha),
            "premulalpha" => Some(Self::PremulAlpha),
            "invdestalpha" => Some(Self::InvDestAlpha),
            "subtract" => Some(Self::Subtract),
            "subtractalpha" => Some(Self::SubtractAlpha),
            _ => None,
        }
    }
}

/// Draws one sprite image at its node's transform
#[derive(Clone, Debug)]
pub struct StaticSprite {
    pub sprite: Option<Arc<Sprite2D>>,
    /// Use `hot_spot` instead of the sprite's own pivot
    pub use_hot_spot: bool,
    pub hot_spot: Vec2,
    /// RGBA tint
    pub color: Vec4,
    pub blend_mode: BlendMode,
    pub layer: i32,
    pub order_in_layer: i32,
}

impl Default for StaticSprite {
    fn default() -> Self {
        Self {
            sprite: None,
            use_hot_spot: false,
            hot_spot: Vec2::splat(0.5),
            color: Vec4::ONE,
            blend_mode: BlendMode::Alpha,
            layer: 0,
            order_in_layer: 0,
        }
    }
}

impl StaticSprite {
    /// Create an empty sprite
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: layer
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    /// Builder: blend mode
    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    /// Builder: hot spot usage
    pub fn with_use_hot_spot(mut self, use_hot_spot: bool) -> Self {
        self.use_hot_spot = use_hot_spot;
        self
    }

    /// Alpha channel of the tint
    pub fn alpha(&self) -> f32 {
        self.color.w
    }

    /// Pivot actually used for drawing
    pub fn effective_hot_spot(&self) -> Vec2 {
        match &self.sprite {
            Some(sprite) if !self.use_hot_spot => sprite.hot_spot,
            _ => self.hot_spot,
        }
    }

    /// Drawn rectangle in node space, empty when no sprite is set
    pub fn local_bounds(&self) -> Rect {
        let Some(sprite) = &self.sprite else {
            return Rect::EMPTY;
        };

        let size = sprite.size * PIXEL_SIZE;
        let min = -size * self.effective_hot_spot();
        Rect::new(min, min + size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprite(size: Vec2) -> Arc<Sprite2D> {
        Arc::new(Sprite2D::new("s", "s.png", size))
    }

    #[test]
    fn test_default() {
        let s = StaticSprite::default();
        assert!(s.sprite.is_none());
        assert_eq!(s.blend_mode, BlendMode::Alpha);
        assert_eq!(s.alpha(), 1.0);
        assert!(s.local_bounds().is_empty());
    }

    #[test]
    fn test_blend_mode_names() {
        assert_eq!(BlendMode::from_name("alpha"), Some(BlendMode::Alpha));
        assert_eq!(BlendMode::from_name("AddAlpha"), Some(BlendMode::AddAlpha));
        assert_eq!(BlendMode::from_name("glow"), None);
        assert_eq!(BlendMode::default(), BlendMode::Alpha);
    }

    #[test]
    fn test_local_bounds_centered() {
        let mut s = StaticSprite::new();
        s.sprite = Some(sprite(Vec2::new(200.0, 100.0)));
        let bounds = s.local_bounds();
        assert!(bounds.min.abs_diff_eq(Vec2::new(-1.0, -0.5), 1e-5));
        assert!(bounds.max.abs_diff_eq(Vec2::new(1.0, 0.5), 1e-5));
    }

    #[test]
    fn test_local_bounds_follow_hot_spot() {
        let mut s = StaticSprite::new().with_use_hot_spot(true);
        s.sprite = Some(sprite(Vec2::new(100.0, 100.0)));
        s.hot_spot = Vec2::ZERO;
        let bounds = s.local_bounds();
        assert!(bounds.min.abs_diff_eq(Vec2::ZERO, 1e-5));
        assert!(bounds.max.abs_diff_eq(Vec2::ONE, 1e-5));

        // Without the override the sprite's own pivot applies
        s.use_hot_spot = false;
        assert!(s.local_bounds().center().abs_diff_eq(Vec2::ZERO, 1e-5));
    }
}
