//! Error types for animated-sprite2d

use thiserror::Error;

/// Main error type for the crate
///
/// Only the loading and validation edges are fallible. Frame evaluation and
/// binding never fail: degenerate input is clamped or treated as unbinding.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Animation error: {0}")]
    Animation(String),

    #[error("Timeline {timeline} has invalid parent index {parent}")]
    InvalidParent { timeline: usize, parent: usize },

    #[error("Timeline {timeline} is part of a cyclic parent chain")]
    CyclicHierarchy { timeline: usize },

    #[error("Unknown sprite '{0}'")]
    UnknownSprite(String),

    #[error("Animation set not found: {0}")]
    AnimationSetNotFound(String),
}
