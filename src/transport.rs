//! Transport boundary.
//!
//! The engine talks to the localization service only through [`Transport`]:
//! send one JSON request, get back a status and a body, or a classified
//! network failure. [`HttpTransport`] is the production implementation.

pub mod http;

pub use http::HttpTransport;

use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Raw response of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
    /// Server-requested wait (`Retry-After`), if any.
    pub retry_after: Option<Duration>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, after: Duration) -> Self {
        self.retry_after = Some(after);
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into an [`Error::Api`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::api(self.status, self.body, self.retry_after))
        }
    }

    /// Parse the body as JSON. An empty body parses as `null`.
    pub fn json(&self) -> Result<serde_json::Value> {
        if self.body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Sends requests to the localization service.
///
/// Implementations own the connection pool. It is shared by every chunk of every
/// call on one engine and released by [`close`](Transport::close) or on drop.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `path` (relative to the service base URL).
    ///
    /// Non-2xx statuses are returned as responses, not errors. Transport-level
    /// failures are returned as [`Error::Network`].
    async fn post(&self, path: &str, body: &serde_json::Value) -> Result<TransportResponse>;

    /// Release pooled connections. Further requests fail.
    async fn close(&self) {}
}
