//! HTTP Transport
//!
//! The transport performs one HTTP exchange and reports the body as either
//! parsed JSON or raw text, based on the response content type. It knows
//! nothing about endpoints or result shapes; interpretation belongs to the
//! client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

/// JSON body of a response
pub type ParsedBody = serde_json::Value;

/// A response body: parsed when the server declared JSON, raw otherwise
pub type ResponseBody = Result<ParsedBody, RawBody>;

/// HTTP method
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// A request ready for the wire
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    /// Method
    pub method: HttpMethod,
    /// Absolute URL
    pub url: String,
    /// JSON body, if any
    pub body: Option<serde_json::Value>,
}

/// A body that was not (valid) JSON
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawBody {
    /// Declared content type, if any
    pub content_type: Option<String>,
    /// Body text
    pub text: String,
}

impl RawBody {
    /// Whether the server claimed this body was JSON
    #[must_use]
    pub fn declares_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
    }
}

/// A response as seen by the client
#[derive(Clone, Debug, PartialEq)]
pub struct HttpReply {
    /// Status code
    pub status: u16,
    /// Reason phrase for the status code
    pub reason: String,
    /// Parsed or raw body
    pub body: ResponseBody,
}

impl HttpReply {
    /// Whether the status is 2xx
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures before a response was received
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The configured timeout elapsed
    #[error("request timed out")]
    Timeout,

    /// Connection, DNS or other transport failure
    #[error("{0}")]
    Network(String),
}

/// Performs HTTP exchanges
///
/// Implement this to run the client against something other than a real
/// HTTP stack (tests, recorded sessions).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name for logs
    fn name(&self) -> &str;

    /// Perform one exchange. No retries.
    async fn execute(&self, request: HttpRequest) -> Result<HttpReply, TransportError>;
}

/// Split a body by content type
///
/// Anything declared `application/json` that parses becomes
/// [`ParsedBody`]; everything else is returned raw.
#[must_use]
pub fn parse_body(content_type: Option<String>, text: String) -> ResponseBody {
    let raw = RawBody { content_type, text };
    if raw.declares_json() {
        if let Ok(value) = serde_json::from_str(&raw.text) {
            return Ok(value);
        }
        tracing::debug!("Body declared JSON but did not parse");
    }

    Err(raw)
}

/// reqwest-backed transport with a fixed client-side timeout
#[derive(Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport whose requests time out after `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Network`] if the HTTP client cannot be
    /// built (TLS backend initialisation failure).
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            timeout,
        })
    }

    /// The configured timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn classify(error: &reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(error.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    fn name(&self) -> &'static str {
        "reqwest"
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpReply, TransportError> {
        let builder = match request.method {
            HttpMethod::Get => self.http_client.get(&request.url),
            HttpMethod::Post => self.http_client.post(&request.url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| classify(&e))?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let text = response.text().await.map_err(|e| classify(&e))?;

        Ok(HttpReply {
            status: status.as_u16(),
            reason,
            body: parse_body(content_type, text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body_json() {
        let body = parse_body(
            Some("application/json; charset=utf-8".to_string()),
            r#"{"success":true}"#.to_string(),
        );
        assert_eq!(body, Ok(serde_json::json!({ "success": true })));
    }

    #[test]
    fn test_parse_body_raw() {
        let html = parse_body(Some("text/html".to_string()), "<h1>hi</h1>".to_string());
        assert_eq!(
            html,
            Err(RawBody {
                content_type: Some("text/html".to_string()),
                text: "<h1>hi</h1>".to_string(),
            })
        );

        let missing = parse_body(None, String::new());
        assert!(missing.is_err());

        let broken = parse_body(Some("application/json".to_string()), "{oops".to_string());
        assert!(broken.is_err_and(|raw| raw.declares_json()));
    }

    #[test]
    fn test_reply_success_range() {
        let reply = HttpReply {
            status: 204,
            reason: "No Content".to_string(),
            body: Err(RawBody::default()),
        };
        assert!(reply.is_success());

        let reply = HttpReply {
            status: 404,
            ..reply
        };
        assert!(!reply.is_success());
    }
}
