//! Scene graph hosting animated sprites

pub mod events;
pub mod graph;
pub mod host;
pub mod manager;
pub mod node;
pub mod sprite;

pub use events::FrameStepBus;
pub use graph::{DrawItem, SceneGraph};
pub use host::SceneHost;
pub use manager::SceneManager;
pub use node::{NodeId, SceneNode};
pub use sprite::{BlendMode, StaticSprite, PIXEL_SIZE};
