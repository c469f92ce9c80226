//! Studio Core - Headless Handwriting Capture for handwriting-studio
//!
//! This crate provides the capture and submission pipeline of the
//! handwriting studio, completely independent of any UI framework. It can
//! drive a terminal surface, a desktop window, or run headless in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        UI Surfaces                           │
//! │      ┌─────────┐   ┌─────────┐   ┌────────────────────┐      │
//! │      │   TUI   │   │ Desktop │   │ Headless / Tests   │      │
//! │      └────┬────┘   └────┬────┘   └─────────┬──────────┘      │
//! │           └─────────────┴──────────────────┘                 │
//! │                          │  pointer events, actions          │
//! └──────────────────────────┼───────────────────────────────────┘
//!                            │
//! ┌──────────────────────────┼───────────────────────────────────┐
//! │                     STUDIO CORE                              │
//! │  ┌───────────────────────┴────────────────────────────────┐  │
//! │  │                    Studio (shell)                      │  │
//! │  │ ┌─────────┐ ┌──────────┐ ┌────────────┐ ┌───────────┐  │  │
//! │  │ │ Stroke  │ │  Letter  │ │ ApiClient  │ │  Render   │  │  │
//! │  │ │ Surface │ │ Session  │ │ (HTTP)     │ │  Display  │  │  │
//! │  │ └─────────┘ └──────────┘ └────────────┘ └───────────┘  │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use studio_core::{load_config, RenderDisplay, SandboxedDisplay, Studio};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let display = RenderDisplay::new(Box::new(SandboxedDisplay::new()), clipboard);
//!     let mut studio = Studio::from_config(&config, display)?;
//!
//!     studio.set_text_input("Hello");
//!     let _ = studio.render_text().await;
//!     println!("{:?}", studio.status());
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`surface`]: Stroke capture onto a raster buffer, PNG export
//! - [`symbols`]: The ordered symbol sequence to capture
//! - [`session`]: Letter session state machine
//! - [`api`]: Request model, transport abstraction and the gateway client
//! - [`display`]: Isolated display of server markup and clipboard copy
//! - [`shell`]: The application shell sequencing user actions
//! - [`config`]: TOML configuration loading
//! - [`error`]: Error taxonomy surfaced to users
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any
//! clipboard backend. Platform concerns are injected through traits.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod display;
pub mod error;
pub mod session;
pub mod shell;
pub mod surface;
pub mod symbols;

// Re-exports for convenience
pub use api::{
    ApiClient, ApiError, HttpMethod, HttpReply, HttpRequest, NonJsonSuccessPolicy, RawBody,
    ReqwestTransport, ResponseBody, SubmissionKind, SubmissionRequest, SubmissionResult,
    Transport, TransportError,
};
pub use config::{
    default_config_path, load_config, load_config_from_path, ApiConfig, CanvasConfig,
    ConfigError, ConfigOverrides, ConfigSource, StudioConfig, StudioToml,
};
pub use display::{ClipboardSink, DisplaySurface, DocumentFrame, RenderDisplay, SandboxedDisplay};
pub use error::{ClipboardError, ErrorKind, StudioError};
pub use session::{CaptureState, LetterSession, Progress};
pub use shell::{
    PendingSubmission, ResolvedSubmission, StatusLevel, StatusMessage, Studio,
};
pub use surface::{EncodedImage, Point, PointerInput, StrokeStyle, StrokeSurface, SurfaceOrigin};
pub use symbols::{SequenceError, SymbolSequence, DEFAULT_SYMBOLS};
