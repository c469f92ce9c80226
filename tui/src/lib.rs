//! Studio TUI - Terminal surface for handwriting-studio
//!
//! A full-screen terminal front end over `studio-core`: draw symbols with
//! the mouse, save them to the handwriting service, type text and preview
//! it rendered in your own handwriting.
//!
//! # Architecture
//!
//! - **Compositor**: Layered rendering and mouse hit testing
//! - **Widgets**: Half-block stroke canvas, scrollable text blocks
//! - **Clipboard**: arboard-backed clipboard sink
//! - **App**: Event loop; network actions run without blocking input

pub mod app;
pub mod clipboard;
pub mod compositor;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use clipboard::SystemClipboard;
