//! 2D skeletal sprite animation

pub mod animator;
pub mod clip;
pub mod config;
pub mod hierarchy;
pub mod loader;
pub mod set;

pub use animator::AnimatedSprite;
pub use clip::{Animation, MainlineKey, Reference, Timeline, TimelineKey, TimelineKind, TimelineSample};
pub use config::AnimatedSpriteConfig;
pub use hierarchy::{TransformHierarchy, TransformInfo};
pub use loader::{load_animation_set, parse_animation_set, AnimationSetDocument};
pub use set::{AnimationSet, AnimationSetCache, ResourceRef, Sprite2D};
