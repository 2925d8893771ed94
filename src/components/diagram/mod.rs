mod animation;
mod component;
mod error;
mod geometry;
mod pointer;
mod render;
mod state;
mod types;

pub use animation::VibrationParams;
pub use component::DiagramCanvas;
#[cfg(test)]
pub use state::DiagramState;
pub use types::{AnchorSpec, ConnectionSpec, NodeSpec, SceneData};
