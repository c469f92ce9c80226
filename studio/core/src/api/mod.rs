//! Handwriting Service API
//!
//! The only network boundary of the studio. Requests are built from the
//! [`SubmissionRequest`] model, carried by a [`Transport`], and folded into a
//! uniform [`SubmissionResult`] or an [`ApiError`] by [`ApiClient`].
//!
//! # Endpoints
//!
//! - `POST /api/save-letter` - store a drawn sample for one symbol
//! - `POST /api/render` - render text in the captured handwriting
//! - `POST /api/generate-test-dataset` - synthesize a font-based sample set
//! - `GET /health` - liveness check
//!
//! # Usage
//!
//! ```ignore
//! use studio_core::api::{ApiClient, SubmissionRequest};
//! use studio_core::ApiConfig;
//!
//! let client = ApiClient::new(ApiConfig::default())?;
//! let result = client.send(SubmissionRequest::RenderText { text: "Hi".into() }).await?;
//! ```

mod client;
mod request;
mod transport;

pub use client::{ApiClient, ApiError, NonJsonSuccessPolicy};
pub use request::{SubmissionKind, SubmissionRequest, SubmissionResult};
pub use transport::{
    parse_body, HttpMethod, HttpReply, HttpRequest, ParsedBody, RawBody, ReqwestTransport,
    ResponseBody, Transport, TransportError,
};
