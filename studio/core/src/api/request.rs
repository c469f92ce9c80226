//! Submission request and result model

use std::fmt;

use serde::Deserialize;

use super::transport::HttpMethod;
use crate::surface::EncodedImage;
use crate::symbols::SymbolSequence;

/// What a submission does; selects method and endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubmissionKind {
    /// Store one drawn symbol
    SaveLetter,
    /// Render text in handwriting
    RenderText,
    /// Generate a test dataset
    GenerateDataset,
    /// Check service health
    HealthCheck,
}

impl SubmissionKind {
    /// Endpoint path, relative to the base URL
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::SaveLetter => "/api/save-letter",
            Self::RenderText => "/api/render",
            Self::GenerateDataset => "/api/generate-test-dataset",
            Self::HealthCheck => "/health",
        }
    }

    /// HTTP method
    #[must_use]
    pub const fn method(self) -> HttpMethod {
        match self {
            Self::HealthCheck => HttpMethod::Get,
            _ => HttpMethod::Post,
        }
    }
}

impl fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SaveLetter => "save-letter",
            Self::RenderText => "render",
            Self::GenerateDataset => "generate-test-dataset",
            Self::HealthCheck => "health",
        };
        f.write_str(name)
    }
}

/// A single logical request to the handwriting service
#[derive(Clone, Debug, PartialEq)]
pub enum SubmissionRequest {
    /// Save the drawing of `symbol`
    SaveLetter {
        /// The symbol that was drawn
        symbol: char,
        /// The exported drawing
        image: EncodedImage,
    },
    /// Render `text` in the captured handwriting
    RenderText {
        /// Text to render, sent as typed
        text: String,
    },
    /// Generate a test dataset covering `symbols`
    GenerateDataset {
        /// Symbols to generate
        symbols: SymbolSequence,
    },
    /// Health check
    HealthCheck,
}

impl SubmissionRequest {
    /// The request's kind
    #[must_use]
    pub fn kind(&self) -> SubmissionKind {
        match self {
            Self::SaveLetter { .. } => SubmissionKind::SaveLetter,
            Self::RenderText { .. } => SubmissionKind::RenderText,
            Self::GenerateDataset { .. } => SubmissionKind::GenerateDataset,
            Self::HealthCheck => SubmissionKind::HealthCheck,
        }
    }

    /// JSON body, `None` for bodiless requests
    #[must_use]
    pub fn body(&self) -> Option<serde_json::Value> {
        match self {
            Self::SaveLetter { symbol, image } => Some(serde_json::json!({
                "letter": symbol.to_string(),
                "imageData": image.as_str(),
            })),
            Self::RenderText { text } => Some(serde_json::json!({ "text": text })),
            Self::GenerateDataset { symbols } => Some(serde_json::json!({
                "letterlist": symbols.to_letter_list(),
            })),
            Self::HealthCheck => None,
        }
    }
}

/// Normalized outcome of an exchange that reached the service
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmissionResult {
    /// HTTP status of the response
    pub status: u16,
    /// Whether the service reported success
    pub success: bool,
    /// Confirmation message on success, error message on failure
    pub message: Option<String>,
    /// Opaque content, e.g. rendered markup
    pub payload: Option<String>,
}

/// Wire shape shared by every endpoint; all fields optional
#[derive(Debug, Default, Deserialize)]
struct WireResult {
    success: Option<bool>,
    message: Option<String>,
    error: Option<String>,
    html_content: Option<String>,
}

impl SubmissionResult {
    /// Success with no body, used for non-JSON 2xx responses
    #[must_use]
    pub fn empty_success(status: u16) -> Self {
        Self {
            status,
            success: true,
            message: None,
            payload: None,
        }
    }

    /// Interpret a JSON body from a 2xx response
    ///
    /// A missing `success` flag counts as success unless an `error` string
    /// is present.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error when the body is not an object of
    /// the expected shape.
    pub fn from_json(status: u16, body: serde_json::Value) -> Result<Self, serde_json::Error> {
        let wire: WireResult = serde_json::from_value(body)?;
        let success = wire.success.unwrap_or(wire.error.is_none());
        let message = if success {
            wire.message
        } else {
            wire.error.or(wire.message)
        };

        Ok(Self {
            status,
            success,
            message,
            payload: wire.html_content,
        })
    }
}
