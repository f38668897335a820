//! animated-sprite2d - 2D skeletal sprite animation over a scene graph

pub mod core;
pub mod math;
pub mod animation;
pub mod scene;
