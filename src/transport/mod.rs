//! Transport contract: executes a [`RequestDescriptor`] against the configured
//! endpoint and hands back a [`RawResponse`] whose body has not been read yet.

mod http;

pub use http::HttpTransport;

use crate::request::RequestDescriptor;
use crate::{BoxStream, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use std::fmt;

/// Executes built requests. Implementations own the base URL and credential;
/// the descriptor only carries a server-relative path.
///
/// The future resolves once response headers are available. Reading the body
/// is a separate phase driven by [`crate::response`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: RequestDescriptor) -> Result<RawResponse>;
}

/// Status, headers and a single-use body stream.
pub struct RawResponse {
    status: u16,
    headers: HeaderMap,
    body: Option<BoxStream<'static, Bytes>>,
}

impl RawResponse {
    pub fn new(status: u16, headers: HeaderMap, body: BoxStream<'static, Bytes>) -> Self {
        Self {
            status,
            headers,
            body: Some(body),
        }
    }

    /// Build a response from an in-memory body (stubs, fixtures).
    pub fn from_bytes(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        let chunk: Bytes = body.into();
        let stream = futures::stream::once(async move { Ok::<_, crate::Error>(chunk) });
        Self::new(status, headers, Box::pin(stream))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Case-insensitive header lookup; non-visible-ASCII values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Hand out the body stream. Only the first call succeeds.
    pub fn take_body(&mut self) -> Result<BoxStream<'static, Bytes>> {
        self.body
            .take()
            .ok_or_else(|| TransportError::BodyConsumed.into())
    }

    pub fn is_consumed(&self) -> bool {
        self.body.is_none()
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Content-Length header is not a number: {0}")]
    InvalidContentLength(String),

    #[error("Response body was already consumed")]
    BodyConsumed,

    #[error("Transport error: {0}")]
    Other(String),
}
