//! Render Display
//!
//! Server-rendered handwriting arrives as a markup document. It is never
//! spliced into the host surface: each [`DisplaySurface::present`] builds a
//! fresh, detached frame and the host only ever reads plain text back out.
//!
//! The handwriting service lays out rendered text as one `div.lines` per
//! line, an `<img>` per glyph named after the glyph's code point
//! (`/images/letters/set1/blue/65.png` for `A`) and an empty `<span>` per
//! space. [`SandboxedDisplay`] reads that layout back into text so the
//! result can be previewed and copied.

use scraper::{ElementRef, Html};

use crate::error::ClipboardError;

/// An isolated surface that shows markup
pub trait DisplaySurface: Send {
    /// Replace whatever is shown with `content` in a new isolated context
    fn present(&mut self, content: &str);

    /// Textual content of the current context, `None` before any present
    fn extract_text(&self) -> Option<String>;
}

/// Destination for copied text
pub trait ClipboardSink: Send {
    /// Put `text` on the clipboard
    ///
    /// # Errors
    ///
    /// Returns [`ClipboardError::AccessDenied`] if the platform refuses.
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// One presented document, detached from every other
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentFrame {
    /// Sequence number of this frame; each present creates a new one
    pub generation: u64,
    /// The markup as received
    pub markup: String,
    /// Text extracted from the markup
    pub text: String,
}

/// Default [`DisplaySurface`]: parses markup into a detached document
#[derive(Debug, Default)]
pub struct SandboxedDisplay {
    frame: Option<DocumentFrame>,
    generation: u64,
}

impl SandboxedDisplay {
    /// Create an empty display
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current frame
    #[must_use]
    pub fn frame(&self) -> Option<&DocumentFrame> {
        self.frame.as_ref()
    }
}

impl DisplaySurface for SandboxedDisplay {
    fn present(&mut self, content: &str) {
        self.generation += 1;
        let text = document_text(content);
        tracing::debug!(
            generation = self.generation,
            markup_bytes = content.len(),
            text_chars = text.chars().count(),
            "Presenting rendered document"
        );
        self.frame = Some(DocumentFrame {
            generation: self.generation,
            markup: content.to_string(),
            text,
        });
    }

    fn extract_text(&self) -> Option<String> {
        self.frame.as_ref().map(|frame| frame.text.clone())
    }
}

/// Extract readable text from a rendered document
///
/// Documents using the glyph layout yield their text line by line; any
/// other markup yields its whitespace-collapsed text content.
#[must_use]
pub fn document_text(markup: &str) -> String {
    let document = Html::parse_document(markup);

    let lines: Vec<String> = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "div" && el.value().classes().any(|c| c == "lines"))
        .map(glyph_line)
        .collect();

    if lines.is_empty() {
        let text: String = document.root_element().text().collect();
        return text.split_whitespace().collect::<Vec<_>>().join(" ");
    }

    lines.join("\n")
}

fn glyph_line(line: ElementRef<'_>) -> String {
    let mut text = String::new();
    for child in line.children() {
        if let Some(element) = ElementRef::wrap(child) {
            match element.value().name() {
                "img" => text.push(glyph_symbol(element.value().attr("src").unwrap_or(""))),
                "span" => text.push(' '),
                _ => text.extend(element.text()),
            }
        } else if let Some(fragment) = child.value().as_text() {
            text.push_str(fragment);
        }
    }
    text.trim_end().to_string()
}

/// `/images/letters/set1/blue/65.png` -> `A`; unknown sources -> `?`
fn glyph_symbol(src: &str) -> char {
    let file = src.rsplit('/').next().unwrap_or(src);
    let stem = file.split('.').next().unwrap_or(file);
    stem.parse::<u32>()
        .ok()
        .and_then(char::from_u32)
        .unwrap_or('?')
}

/// The display region plus clipboard access
pub struct RenderDisplay {
    surface: Box<dyn DisplaySurface>,
    clipboard: Box<dyn ClipboardSink>,
    presented: bool,
}

impl RenderDisplay {
    /// Compose a display surface with a clipboard
    #[must_use]
    pub fn new(surface: Box<dyn DisplaySurface>, clipboard: Box<dyn ClipboardSink>) -> Self {
        Self {
            surface,
            clipboard,
            presented: false,
        }
    }

    /// Show `markup` in a freshly isolated context
    pub fn present(&mut self, markup: &str) {
        self.surface.present(markup);
        self.presented = true;
    }

    /// Whether anything has been presented
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.presented
    }

    /// Text of the current content
    #[must_use]
    pub fn text(&self) -> Option<String> {
        if self.presented {
            self.surface.extract_text()
        } else {
            None
        }
    }

    /// Copy the displayed text to the clipboard, returning its length in chars
    ///
    /// # Errors
    ///
    /// [`ClipboardError::NothingRendered`] before any present (the
    /// clipboard is not touched), or the clipboard's own error.
    pub fn copy_content(&mut self) -> Result<usize, ClipboardError> {
        let text = self.text().ok_or(ClipboardError::NothingRendered)?;
        self.clipboard.set_text(&text)?;
        Ok(text.chars().count())
    }
}

impl std::fmt::Debug for RenderDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderDisplay")
            .field("presented", &self.presented)
            .finish_non_exhaustive()
    }
}
