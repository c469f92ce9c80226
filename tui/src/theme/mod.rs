//! Theme and Colors
//!
//! A quiet, paper-and-ink palette. The canvas itself takes its colours from
//! the stroke style so the preview matches the exported image.

use ratatui::style::Color;
use studio_core::StatusLevel;

// ============================================================================
// UI Colors
// ============================================================================

/// Accent for the symbol prompt and panel titles
pub const ACCENT_BLUE: Color = Color::Rgb(100, 160, 255);

/// Text input
pub const INPUT_GREEN: Color = Color::Rgb(130, 220, 130);

/// Hints, separators, placeholders
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Progress and informational status
pub const INFO_YELLOW: Color = Color::Rgb(255, 223, 128);

/// Error status
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Success status
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// Rendered handwriting preview
pub const PREVIEW_INK: Color = Color::Rgb(90, 130, 230);

/// Colour of a status message
pub fn status_color(level: StatusLevel) -> Color {
    match level {
        StatusLevel::Info => INFO_YELLOW,
        StatusLevel::Success => SUCCESS_GREEN,
        StatusLevel::Error => ERROR_RED,
    }
}
