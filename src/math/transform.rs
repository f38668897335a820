//! 2D transform with position, angle and scale

use std::ops::Mul;

use crate::core::types::{Affine2, Vec2};

/// A 2D transform. `angle` is in degrees, counter-clockwise.
///
/// Composition (`parent * child`) scales the child's position by the parent
/// scale, rotates it by the parent angle and offsets it by the parent
/// position; angles add and scales multiply component-wise. This keeps the
/// angle unbounded, which interpolation relies on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    pub position: Vec2,
    pub angle: f32,
    pub scale: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    /// Identity transform (no translation, rotation, or scaling).
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        angle: 0.0,
        scale: Vec2::ONE,
    };

    /// Create a transform from its parts
    pub fn new(position: Vec2, angle: f32, scale: Vec2) -> Self {
        Self {
            position,
            angle,
            scale,
        }
    }

    /// Create a translation-only transform.
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Interpolate towards `other`.
    ///
    /// `spin` selects the arc for the angle: positive rotates counter-clockwise
    /// (the target angle is unwrapped upwards by a full turn when it is
    /// smaller), negative rotates clockwise (unwrapped downwards when larger),
    /// zero interpolates the raw angles.
    pub fn lerp(&self, other: &Self, t: f32, spin: i32) -> Self {
        let target_angle = if spin > 0 && self.angle > other.angle {
            other.angle + 360.0
        } else if spin < 0 && self.angle < other.angle {
            other.angle - 360.0
        } else {
            other.angle
        };

        Self {
            position: self.position.lerp(other.position, t),
            angle: self.angle + (target_angle - self.angle) * t,
            scale: self.scale.lerp(other.scale, t),
        }
    }

    /// Convert to an affine matrix (scale, then rotate, then translate).
    pub fn to_affine(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(self.scale, self.angle.to_radians(), self.position)
    }

    /// Transform a point from this transform's space into its parent space.
    pub fn transform_point(&self, point: Vec2) -> Vec2 {
        let scaled = point * self.scale;
        let (s, c) = self.angle.to_radians().sin_cos();
        self.position + Vec2::new(scaled.x * c - scaled.y * s, scaled.x * s + scaled.y * c)
    }

    /// Approximate equality, used when comparing sampled poses.
    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f32) -> bool {
        self.position.abs_diff_eq(other.position, max_abs_diff)
            && (self.angle - other.angle).abs() <= max_abs_diff
            && self.scale.abs_diff_eq(other.scale, max_abs_diff)
    }
}

impl Mul for Transform2D {
    type Output = Transform2D;

    fn mul(self, child: Transform2D) -> Transform2D {
        Transform2D {
            position: self.transform_point(child.position),
            angle: self.angle + child.angle,
            scale: self.scale * child.scale,
        }
    }
}
