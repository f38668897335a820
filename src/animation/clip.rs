//! Animation definitions: timelines, dense timeline keys and mainline keys

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{Error, Result};
use crate::core::types::Vec2;
use crate::math::Transform2D;

use super::set::Sprite2D;

/// What kind of object a timeline animates.
///
/// Only [`TimelineKind::Sprite`] is instantiated as a renderable child entity.
/// Other kinds keep their slot in the instance table so that indices stay
/// aligned with the definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineKind {
    Sprite,
    Bone,
    Box,
    Point,
}

impl TimelineKind {
    /// Whether timelines of this kind get a renderable entity
    pub fn requires_renderable(self) -> bool {
        matches!(self, TimelineKind::Sprite)
    }
}

/// A dense keyframe on a single timeline
#[derive(Clone, Debug)]
pub struct TimelineKey {
    pub time: f32,
    pub transform: Transform2D,
    /// Rotation direction towards the next key: >0 counter-clockwise,
    /// <0 clockwise, 0 plain interpolation.
    pub spin: i32,
    pub sprite: Option<Arc<Sprite2D>>,
    /// Normalized pivot within the sprite image
    pub hot_spot: Vec2,
    pub alpha: f32,
}

impl TimelineKey {
    /// Create a key with the given transform, no sprite, centered hot spot
    /// and full alpha
    pub fn new(time: f32, transform: Transform2D) -> Self {
        Self {
            time,
            transform,
            spin: 1,
            sprite: None,
            hot_spot: Vec2::splat(0.5),
            alpha: 1.0,
        }
    }

    /// Set the spin direction
    pub fn with_spin(mut self, spin: i32) -> Self {
        self.spin = spin;
        self
    }

    /// Set the sprite reference
    pub fn with_sprite(mut self, sprite: Arc<Sprite2D>) -> Self {
        self.sprite = Some(sprite);
        self
    }

    /// Set the hot spot
    pub fn with_hot_spot(mut self, hot_spot: Vec2) -> Self {
        self.hot_spot = hot_spot;
        self
    }

    /// Set the alpha
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }
}

/// One animated part of an animation
#[derive(Clone, Debug)]
pub struct Timeline {
    pub name: String,
    pub kind: TimelineKind,
    /// Index of the parent timeline, `None` for roots
    pub parent: Option<usize>,
    /// Keys sorted by ascending time
    pub keys: Vec<TimelineKey>,
}

impl Timeline {
    /// Create a new timeline without keys
    pub fn new(name: impl Into<String>, kind: TimelineKind, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            kind,
            parent,
            keys: Vec::new(),
        }
    }

    /// Add a key (maintains sorted order by time)
    pub fn add_key(&mut self, key: TimelineKey) {
        let pos = self.keys.partition_point(|k| k.time <= key.time);
        self.keys.insert(pos, key);
    }

    /// Builder form of [`Timeline::add_key`]
    pub fn with_key(mut self, key: TimelineKey) -> Self {
        self.add_key(key);
        self
    }

    /// Sample the timeline at `time`.
    ///
    /// Picks the first key pair whose end time is at or after `time`; past
    /// the last key the last pair is used. A single key is treated as a
    /// zero-length interval. Returns `None` for a timeline without keys.
    pub fn sample(&self, time: f32) -> Option<TimelineSample> {
        let (current, next) = match self.keys.len() {
            0 => return None,
            1 => (&self.keys[0], &self.keys[0]),
            len => {
                let j = self
                    .keys
                    .windows(2)
                    .position(|pair| time <= pair[1].time)
                    .unwrap_or(len - 2);
                (&self.keys[j], &self.keys[j + 1])
            }
        };

        let duration = next.time - current.time;
        let t = if duration > 0.0 {
            ((time - current.time) / duration).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Some(TimelineSample {
            transform: current.transform.lerp(&next.transform, t, current.spin),
            sprite: current.sprite.clone(),
            hot_spot: current.hot_spot.lerp(next.hot_spot, t),
            alpha: current.alpha + (next.alpha - current.alpha) * t,
        })
    }
}

/// Interpolated state of one timeline at one instant
#[derive(Clone, Debug)]
pub struct TimelineSample {
    pub transform: Transform2D,
    /// Sprite of the interval's start key; images cut at key boundaries
    pub sprite: Option<Arc<Sprite2D>>,
    pub hot_spot: Vec2,
    pub alpha: f32,
}

/// Per-timeline entry of a mainline key
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reference {
    /// Draw order offset relative to the component's order in layer
    pub z_index: i32,
}

/// Sparse keyframe selecting active timelines and their draw order
#[derive(Clone, Debug, Default)]
pub struct MainlineKey {
    pub time: f32,
    pub references: HashMap<usize, Reference>,
}

impl MainlineKey {
    /// Create a mainline key with no active timelines
    pub fn new(time: f32) -> Self {
        Self {
            time,
            references: HashMap::new(),
        }
    }

    /// Mark `timeline` active at this key with the given z index
    pub fn with_reference(mut self, timeline: usize, z_index: i32) -> Self {
        self.references.insert(timeline, Reference { z_index });
        self
    }

    /// Reference for a timeline, `None` if it is inactive at this key
    pub fn reference(&self, timeline: usize) -> Option<&Reference> {
        self.references.get(&timeline)
    }
}

/// An immutable animation definition
#[derive(Clone, Debug)]
pub struct Animation {
    pub name: String,
    pub length: f32,
    pub looped: bool,
    pub timelines: Vec<Timeline>,
    /// Keys sorted by ascending time
    pub mainline_keys: Vec<MainlineKey>,
}

impl Animation {
    /// Create an empty animation
    pub fn new(name: impl Into<String>, length: f32, looped: bool) -> Self {
        Self {
            name: name.into(),
            length,
            looped,
            timelines: Vec::new(),
            mainline_keys: Vec::new(),
        }
    }

    /// Add a timeline, returns its index
    pub fn add_timeline(&mut self, timeline: Timeline) -> usize {
        let index = self.timelines.len();
        self.timelines.push(timeline);
        index
    }

    /// Add a mainline key (maintains sorted order by time)
    pub fn add_mainline_key(&mut self, key: MainlineKey) {
        let pos = self.mainline_keys.partition_point(|k| k.time <= key.time);
        self.mainline_keys.insert(pos, key);
    }

    /// Number of timelines
    pub fn timeline_count(&self) -> usize {
        self.timelines.len()
    }

    /// Normalize an accumulated play time into the sampling domain.
    ///
    /// Looped animations wrap into `[0, length)` (negative times wrap from
    /// the end); others clamp to `[0, length]`.
    pub fn normalize_time(&self, time: f32) -> f32 {
        if self.length.is_nan() || self.length <= 0.0 {
            return 0.0;
        }

        if self.looped {
            let wrapped = time % self.length;
            if wrapped < 0.0 {
                wrapped + self.length
            } else {
                wrapped
            }
        } else {
            time.clamp(0.0, self.length)
        }
    }

    /// The mainline key active at `time`: the key before the first key
    /// (from the second on) whose time exceeds `time`, else the last key.
    pub fn mainline_key_at(&self, time: f32) -> Option<&MainlineKey> {
        self.mainline_keys
            .iter()
            .skip(1)
            .position(|key| time < key.time)
            .map(|i| &self.mainline_keys[i])
            .or_else(|| self.mainline_keys.last())
    }

    /// Check that the length is positive and finite, that every parent index
    /// is in range and that every parent chain ends at a root.
    pub fn validate(&self) -> Result<()> {
        if !self.length.is_finite() || self.length <= 0.0 {
            return Err(Error::Animation(format!(
                "animation '{}' has invalid length {}",
                self.name, self.length
            )));
        }

        let count = self.timelines.len();

        for (index, timeline) in self.timelines.iter().enumerate() {
            if let Some(parent) = timeline.parent {
                if parent >= count || parent == index {
                    return Err(Error::InvalidParent { timeline: index, parent });
                }
            }
        }

        // A chain longer than the table must revisit a timeline
        for start in 0..count {
            let mut steps = 0;
            let mut current = self.timelines[start].parent;
            while let Some(parent) = current {
                steps += 1;
                if steps > count {
                    return Err(Error::CyclicHierarchy { timeline: start });
                }
                current = self.timelines[parent].parent;
            }
        }

        Ok(())
    }
}
