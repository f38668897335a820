//! Mathematical utilities and data structures

pub mod rect;
pub mod transform;

pub use rect::Rect;
pub use transform::Transform2D;
