//! API Gateway Client
//!
//! Turns [`SubmissionRequest`]s into HTTP exchanges and normalizes every
//! outcome into a [`SubmissionResult`] or an [`ApiError`].
//!
//! # Response handling
//!
//! | Reply                               | Outcome                              |
//! |-------------------------------------|--------------------------------------|
//! | 2xx, JSON                           | `SubmissionResult` from the body     |
//! | 2xx, declared JSON but malformed    | `ApiError::Protocol`                 |
//! | 2xx, not JSON                       | per [`NonJsonSuccessPolicy`]         |
//! | ≥ 400, JSON with `error` string     | `ApiError::Server` with that message |
//! | ≥ 400, JSON without `error`         | `ApiError::Server` "Server error: N" |
//! | ≥ 400, unparseable                  | `ApiError::Protocol` status + reason |
//! | timeout                             | `ApiError::Timeout`                  |
//! | connection failure                  | `ApiError::Network`                  |

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::request::{SubmissionKind, SubmissionRequest, SubmissionResult};
use super::transport::{HttpReply, HttpRequest, ReqwestTransport, Transport, TransportError};
use crate::config::ApiConfig;
use crate::error::ErrorKind;
use crate::surface::EncodedImage;
use crate::symbols::SymbolSequence;

/// What to do with a 2xx response whose body is not JSON
///
/// The service is not under our control and some deployments answer
/// with an empty or HTML body on success.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonJsonSuccessPolicy {
    /// Report success with an empty payload
    #[default]
    AcceptAsEmpty,
    /// Report a protocol error
    Reject,
}

/// Failures of a submission
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The service could not be reached
    #[error(
        "Network error - could not reach the handwriting service at {url}; check that it is running ({detail})"
    )]
    Network {
        /// URL that was requested
        url: String,
        /// Transport failure detail
        detail: String,
    },

    /// No response within the configured timeout
    #[error("Request to {url} timed out after {timeout_ms} ms")]
    Timeout {
        /// URL that was requested
        url: String,
        /// The configured timeout
        timeout_ms: u64,
    },

    /// The service reported an error in a structured body
    #[error("{message}")]
    Server {
        /// HTTP status
        status: u16,
        /// Message from the body
        message: String,
    },

    /// The response could not be interpreted
    #[error("HTTP error: {status} {reason}")]
    Protocol {
        /// HTTP status
        status: u16,
        /// Reason phrase or description
        reason: String,
    },
}

impl ApiError {
    /// Classify this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Server { .. } => ErrorKind::Server,
            Self::Protocol { .. } => ErrorKind::Protocol,
        }
    }
}

/// Client for the handwriting service
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Create a client backed by reqwest
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over an arbitrary transport
    #[must_use]
    pub fn with_transport(config: ApiConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// The client configuration
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Absolute URL of an endpoint
    #[must_use]
    pub fn endpoint_url(&self, kind: SubmissionKind) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            kind.path()
        )
    }

    /// Send a request and normalize the response
    ///
    /// # Errors
    ///
    /// See the module documentation for the mapping of replies to errors.
    pub async fn send(&self, request: SubmissionRequest) -> Result<SubmissionResult, ApiError> {
        let kind = request.kind();
        let method = kind.method();
        let url = self.endpoint_url(kind);

        tracing::debug!(
            %method,
            path = kind.path(),
            transport = self.transport.name(),
            "API request"
        );

        let http_request = HttpRequest {
            method,
            url: url.clone(),
            body: request.body(),
        };

        let reply = match self.transport.execute(http_request).await {
            Ok(reply) => reply,
            Err(TransportError::Timeout) => {
                tracing::warn!(path = kind.path(), timeout_ms = self.config.timeout_ms, "API request timed out");
                return Err(ApiError::Timeout {
                    url,
                    timeout_ms: self.config.timeout_ms,
                });
            }
            Err(TransportError::Network(detail)) => {
                tracing::warn!(path = kind.path(), error = %detail, "API request failed");
                return Err(ApiError::Network { url, detail });
            }
        };

        if reply.is_success() {
            tracing::debug!(status = reply.status, path = kind.path(), "API response");
        } else {
            tracing::warn!(status = reply.status, path = kind.path(), "API error response");
        }

        self.interpret(kind, reply)
    }

    fn interpret(&self, kind: SubmissionKind, reply: HttpReply) -> Result<SubmissionResult, ApiError> {
        let HttpReply {
            status,
            reason,
            body,
        } = reply;

        if !(200..300).contains(&status) {
            // Error bodies are tried as JSON whatever their declared type.
            let parsed = match body {
                Ok(value) => Some(value),
                Err(raw) => serde_json::from_str::<serde_json::Value>(&raw.text).ok(),
            };

            return Err(match parsed {
                Some(value) => {
                    let message = value
                        .get("error")
                        .and_then(serde_json::Value::as_str)
                        .map_or_else(|| format!("Server error: {status}"), str::to_owned);
                    ApiError::Server { status, message }
                }
                None => ApiError::Protocol { status, reason },
            });
        }

        match body {
            Ok(value) => SubmissionResult::from_json(status, value).map_err(|e| {
                tracing::warn!(path = kind.path(), error = %e, "Unexpected response shape");
                ApiError::Protocol {
                    status,
                    reason: format!("unexpected response body ({e})"),
                }
            }),
            Err(raw) if raw.declares_json() => {
                tracing::warn!(path = kind.path(), "Response declared JSON but did not parse");
                Err(ApiError::Protocol {
                    status,
                    reason: "malformed JSON response".to_string(),
                })
            }
            Err(raw) => match self.config.non_json_success {
                NonJsonSuccessPolicy::AcceptAsEmpty => {
                    tracing::warn!(
                        path = kind.path(),
                        content_type = raw.content_type.as_deref().unwrap_or("none"),
                        "Response is not JSON, treating as empty success"
                    );
                    Ok(SubmissionResult::empty_success(status))
                }
                NonJsonSuccessPolicy::Reject => Err(ApiError::Protocol {
                    status,
                    reason: format!(
                        "response was not JSON (content type {})",
                        raw.content_type.as_deref().unwrap_or("none")
                    ),
                }),
            },
        }
    }

    /// Save the drawing of one symbol
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn save_letter(
        &self,
        symbol: char,
        image: EncodedImage,
    ) -> Result<SubmissionResult, ApiError> {
        self.send(SubmissionRequest::SaveLetter { symbol, image })
            .await
    }

    /// Render text in handwriting
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn render_text(&self, text: impl Into<String>) -> Result<SubmissionResult, ApiError> {
        self.send(SubmissionRequest::RenderText { text: text.into() })
            .await
    }

    /// Generate a test dataset for `symbols`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn generate_dataset(
        &self,
        symbols: SymbolSequence,
    ) -> Result<SubmissionResult, ApiError> {
        self.send(SubmissionRequest::GenerateDataset { symbols })
            .await
    }

    /// Check whether the service is healthy
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn health_check(&self) -> Result<SubmissionResult, ApiError> {
        self.send(SubmissionRequest::HealthCheck).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("transport", &self.transport.name())
            .finish()
    }
}
