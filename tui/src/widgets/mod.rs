//! Custom widgets

pub mod canvas;
pub mod text_block;

pub use canvas::{CanvasViewport, StrokeCanvas};
pub use text_block::{TextBlock, TextBlockState};
