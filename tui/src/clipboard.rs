//! System clipboard backed by arboard

use studio_core::{ClipboardError, ClipboardSink};

/// Copies text to the desktop clipboard
///
/// A handle is opened per copy so the sink stays `Send` on every platform.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::AccessDenied(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::AccessDenied(e.to_string()))?;
        tracing::debug!(chars = text.chars().count(), "Wrote system clipboard");
        Ok(())
    }
}
