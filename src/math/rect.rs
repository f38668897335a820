//! Axis-aligned 2D bounding rectangle

use crate::core::types::{Affine2, Vec2};

/// Axis-aligned rectangle defined by min and max corners.
///
/// [`Rect::EMPTY`] has inverted infinite corners so that merging anything
/// into it yields the other operand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Rect {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Rect {
    /// A rectangle containing nothing
    pub const EMPTY: Self = Self {
        min: Vec2::splat(f32::INFINITY),
        max: Vec2::splat(f32::NEG_INFINITY),
    };

    /// Create rect from min and max corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// True if no point has been merged in
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Get center point
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Check if point is inside the rect
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
        p.y >= self.min.y && p.y <= self.max.y
    }

    /// Expand rect to include point
    pub fn expand(&mut self, point: Vec2) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Return merged rect containing both
    pub fn merged(&self, other: &Rect) -> Rect {
        Rect {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Bounds of this rect after an affine transform (all four corners).
    pub fn transformed(&self, transform: &Affine2) -> Rect {
        if self.is_empty() {
            return Self::EMPTY;
        }

        let corners = [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ];

        let mut out = Self::EMPTY;
        for corner in corners {
            out.expand(transform.transform_point2(corner));
        }
        out
    }
}
