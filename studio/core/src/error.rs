//! Error Taxonomy
//!
//! Every failure a user can run into is one of a small set of kinds. The
//! shell converts each into a status message; none of them is fatal.

use thiserror::Error;

use crate::api::ApiError;

/// User-facing classification of a failure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Detected locally, never reached the network
    Validation,
    /// Connection refused, DNS failure, other transport failure
    Network,
    /// The client timeout elapsed
    Timeout,
    /// Failed status with a structured error body
    Server,
    /// Failed status with an unparseable body
    Protocol,
    /// Nothing to copy, or clipboard access denied
    Clipboard,
    /// Rejected because another request is in flight
    Busy,
}

/// Clipboard failures
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClipboardError {
    /// Copy requested before anything was presented
    #[error("Nothing has been rendered yet")]
    NothingRendered,

    /// The platform refused clipboard access
    #[error("Clipboard access denied: {0}")]
    AccessDenied(String),
}

/// Errors surfaced by the application shell
#[derive(Debug, Error)]
pub enum StudioError {
    /// Invalid local input
    #[error("{0}")]
    Validation(String),

    /// Failure talking to the handwriting service
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Failure copying rendered output
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    /// Another action is in flight
    #[error("Another request is still in progress")]
    Busy,
}

impl StudioError {
    /// Classify this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Api(e) => e.kind(),
            Self::Clipboard(_) => ErrorKind::Clipboard,
            Self::Busy => ErrorKind::Busy,
        }
    }
}
