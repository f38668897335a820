//! JSON animation-set documents
//!
//! The on-disk format mirrors the runtime types but refers to sprites by name
//! and to parents by index. Everything is checked while building the runtime
//! [`AnimationSet`]: unknown sprites, out-of-range references, bad parents,
//! non-positive lengths and descending key times are load errors.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::core::types::Vec2;
use crate::math::Transform2D;

use super::clip::{Animation, MainlineKey, Timeline, TimelineKey, TimelineKind};
use super::set::{AnimationSet, Sprite2D};

fn default_hot_spot() -> [f32; 2] {
    [0.5, 0.5]
}

fn default_scale() -> [f32; 2] {
    [1.0, 1.0]
}

fn default_alpha() -> f32 {
    1.0
}

fn default_spin() -> i32 {
    1
}

/// Sprite entry of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteDocument {
    pub name: String,
    pub texture: String,
    /// Image size in pixels
    pub size: [f32; 2],
    #[serde(default = "default_hot_spot")]
    pub hot_spot: [f32; 2],
}

/// Timeline key entry of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyDocument {
    pub time: f32,
    #[serde(default)]
    pub position: [f32; 2],
    /// Degrees
    #[serde(default)]
    pub angle: f32,
    #[serde(default = "default_scale")]
    pub scale: [f32; 2],
    #[serde(default = "default_spin")]
    pub spin: i32,
    #[serde(default)]
    pub sprite: Option<String>,
    #[serde(default = "default_hot_spot")]
    pub hot_spot: [f32; 2],
    #[serde(default = "default_alpha")]
    pub alpha: f32,
}

/// Timeline entry of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineDocument {
    pub name: String,
    pub kind: TimelineKind,
    #[serde(default)]
    pub parent: Option<usize>,
    pub keys: Vec<KeyDocument>,
}

/// Mainline reference entry of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceDocument {
    pub timeline: usize,
    #[serde(default)]
    pub z_index: i32,
}

/// Mainline key entry of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainlineKeyDocument {
    pub time: f32,
    #[serde(default)]
    pub references: Vec<ReferenceDocument>,
}

/// Animation entry of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationDocument {
    pub name: String,
    pub length: f32,
    #[serde(default)]
    pub looped: bool,
    pub timelines: Vec<TimelineDocument>,
    pub mainline: Vec<MainlineKeyDocument>,
}

/// A whole animation-set document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimationSetDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sprites: Vec<SpriteDocument>,
    pub animations: Vec<AnimationDocument>,
}

impl AnimationSetDocument {
    /// Build the runtime animation set
    pub fn build(&self) -> Result<AnimationSet> {
        let mut set = AnimationSet::new(self.name.clone());

        for sprite in &self.sprites {
            set.add_sprite(Sprite2D {
                name: sprite.name.clone(),
                texture: sprite.texture.clone(),
                size: Vec2::from(sprite.size),
                hot_spot: Vec2::from(sprite.hot_spot),
            });
        }

        for doc in &self.animations {
            let animation = build_animation(doc, &set)?;
            set.add_animation(animation)?;
        }

        Ok(set)
    }
}

fn build_animation(doc: &AnimationDocument, set: &AnimationSet) -> Result<Animation> {
    if !doc.length.is_finite() || doc.length <= 0.0 {
        return Err(Error::Animation(format!(
            "animation '{}' has non-positive length {}",
            doc.name, doc.length
        )));
    }

    let mut animation = Animation::new(doc.name.clone(), doc.length, doc.looped);

    for timeline_doc in &doc.timelines {
        let mut timeline = Timeline::new(timeline_doc.name.clone(), timeline_doc.kind, timeline_doc.parent);

        let mut previous_time = f32::NEG_INFINITY;
        for key_doc in &timeline_doc.keys {
            if key_doc.time < previous_time {
                return Err(Error::Animation(format!(
                    "timeline '{}' in '{}' has keys out of time order",
                    timeline_doc.name, doc.name
                )));
            }
            previous_time = key_doc.time;

            let sprite = match &key_doc.sprite {
                Some(name) => Some(
                    set.sprite(name)
                        .cloned()
                        .ok_or_else(|| Error::UnknownSprite(name.clone()))?,
                ),
                None => None,
            };

            timeline.keys.push(TimelineKey {
                time: key_doc.time,
                transform: Transform2D::new(
                    Vec2::from(key_doc.position),
                    key_doc.angle,
                    Vec2::from(key_doc.scale),
                ),
                spin: key_doc.spin,
                sprite,
                hot_spot: Vec2::from(key_doc.hot_spot),
                alpha: key_doc.alpha,
            });
        }

        if timeline.keys.is_empty() {
            log::warn!("Timeline '{}' in '{}' has no keys", timeline_doc.name, doc.name);
        }

        animation.add_timeline(timeline);
    }

    let timeline_count = animation.timeline_count();
    for key_doc in &doc.mainline {
        let mut key = MainlineKey::new(key_doc.time);
        for reference in &key_doc.references {
            if reference.timeline >= timeline_count {
                return Err(Error::Animation(format!(
                    "mainline key at {} in '{}' references missing timeline {}",
                    key_doc.time, doc.name, reference.timeline
                )));
            }
            key = key.with_reference(reference.timeline, reference.z_index);
        }
        animation.add_mainline_key(key);
    }

    Ok(animation)
}

/// Parse an animation set from a JSON string
pub fn parse_animation_set(json: &str) -> Result<AnimationSet> {
    let doc: AnimationSetDocument = serde_json::from_str(json)?;
    doc.build()
}

/// Load an animation set from a JSON file
pub fn load_animation_set(path: &Path) -> Result<AnimationSet> {
    let json = std::fs::read_to_string(path)?;
    let mut set = parse_animation_set(&json)?;
    if set.name.is_empty() {
        if let Some(stem) = path.file_stem() {
            set.name = stem.to_string_lossy().into_owned();
        }
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const HERO: &str = r#"{
        "name": "hero",
        "sprites": [
            { "name": "torso", "texture": "torso.png", "size": [64, 128] },
            { "name": "arm", "texture": "arm.png", "size": [16, 64], "hot_spot": [0.5, 0.0] }
        ],
        "animations": [{
            "name": "wave",
            "length": 1.0,
            "looped": true,
            "timelines": [
                { "name": "torso", "kind": "sprite",
                  "keys": [ { "time": 0.0, "sprite": "torso" },
                            { "time": 0.5, "position": [0, 4], "sprite": "torso" } ] },
                { "name": "shoulder", "kind": "bone", "parent": 0,
                  "keys": [ { "time": 0.0, "angle": 350, "spin": 1 },
                            { "time": 1.0, "angle": 10 } ] },
                { "name": "arm", "kind": "sprite", "parent": 1,
                  "keys": [ { "time": 0.0, "sprite": "arm", "alpha": 0.5 } ] }
            ],
            "mainline": [
                { "time": 0.0, "references": [ { "timeline": 0 }, { "timeline": 2, "z_index": 1 } ] },
                { "time": 0.5, "references": [ { "timeline": 0 } ] }
            ]
        }]
    }"#;

    #[test]
    fn test_parse_document() {
        let set = parse_animation_set(HERO).unwrap();
        assert_eq!(set.name, "hero");
        let wave = set.animation("wave").unwrap();
        assert!(wave.looped);
        assert_eq!(wave.timeline_count(), 3);
        assert_eq!(wave.timelines[1].kind, TimelineKind::Bone);
        assert_eq!(wave.timelines[2].parent, Some(1));
        assert_eq!(wave.mainline_keys.len(), 2);
        assert_eq!(wave.mainline_keys[0].reference(2).unwrap().z_index, 1);
        assert!(wave.mainline_keys[1].reference(2).is_none());
    }

    #[test]
    fn test_key_defaults() {
        let set = parse_animation_set(HERO).unwrap();
        let key = &set.animation("wave").unwrap().timelines[0].keys[0];
        assert_eq!(key.transform, Transform2D::IDENTITY);
        assert_eq!(key.spin, 1);
        assert_eq!(key.alpha, 1.0);
        assert_eq!(key.hot_spot, Vec2::splat(0.5));
    }

    #[test]
    fn test_sprites_are_shared() {
        let set = parse_animation_set(HERO).unwrap();
        let wave = set.animation("wave").unwrap();
        let key_sprite = wave.timelines[0].keys[1].sprite.as_ref().unwrap();
        assert!(Arc::ptr_eq(key_sprite, set.sprite("torso").unwrap()));
        assert_eq!(set.sprite("arm").unwrap().hot_spot, Vec2::new(0.5, 0.0));
    }

    #[test]
    fn test_unknown_sprite() {
        let json = HERO.replace(r#""sprite": "arm""#, r#""sprite": "leg""#);
        assert!(matches!(parse_animation_set(&json), Err(Error::UnknownSprite(name)) if name == "leg"));
    }

    #[test]
    fn test_cyclic_parent_rejected() {
        // torso -> arm -> shoulder -> torso
        let json = HERO.replacen(r#""kind": "sprite","#, r#""kind": "sprite", "parent": 2,"#, 1);
        assert!(matches!(parse_animation_set(&json), Err(Error::CyclicHierarchy { .. })));
    }

    #[test]
    fn test_missing_mainline_timeline_rejected() {
        let json = HERO.replace(r#""z_index": 1"#, r#""z_index": 1 }, { "timeline": 9"#);
        assert!(matches!(parse_animation_set(&json), Err(Error::Animation(_))));
    }

    #[test]
    fn test_keys_out_of_order_rejected() {
        let json = HERO.replace(r#""time": 0.5, "position""#, r#""time": -0.5, "position""#);
        assert!(matches!(parse_animation_set(&json), Err(Error::Animation(_))));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_animation_set("{ not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_load_from_file_names_set_after_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("villain.json");
        std::fs::write(&path, HERO.replace(r#""name": "hero","#, "")).unwrap();

        let set = load_animation_set(&path).unwrap();
        assert_eq!(set.name, "villain");
        assert!(set.animation("wave").is_some());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_animation_set(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
