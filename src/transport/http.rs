use super::{Transport, TransportResponse};
use crate::error::NetworkErrorKind;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Proxy;
use std::env;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// `reqwest`-backed transport with a pooled client.
pub struct HttpTransport {
    client: RwLock<Option<reqwest::Client>>,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
            Error::validation_with_context(
                "api_key contains characters not allowed in an HTTP header",
                ErrorContext::new()
                    .with_field_path("config.api_key")
                    .with_source("http_transport"),
            )
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("lingo-engine-rust/", env!("CARGO_PKG_VERSION"))),
        );

        // Pool knobs are env-overridable; unparsable values fall back to defaults.
        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .pool_max_idle_per_host(
                env::var("LINGODOTDEV_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(30),
            )
            .pool_idle_timeout(Some(Duration::from_secs(
                env::var("LINGODOTDEV_HTTP_POOL_IDLE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(90),
            )));

        if let Ok(proxy_url) = env::var("LINGODOTDEV_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::network(NetworkErrorKind::Other, e.to_string()))?;

        Ok(Self {
            client: RwLock::new(Some(client)),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_closed(&self) -> bool {
        self.client
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .is_none()
    }

    fn client(&self) -> Result<reqwest::Client> {
        self.client
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
            .ok_or_else(|| {
                Error::configuration_with_context(
                    "transport is closed",
                    ErrorContext::new().with_source("http_transport"),
                )
            })
    }

    fn map_error(e: reqwest::Error) -> Error {
        let kind = if e.is_timeout() {
            NetworkErrorKind::Timeout
        } else if e.is_connect() || e.is_request() || e.is_body() {
            NetworkErrorKind::Connection
        } else {
            NetworkErrorKind::Other
        };
        Error::network(kind, e.to_string())
    }

    /// Only the `Retry-After: <seconds>` form is supported.
    fn retry_after(headers: &HeaderMap) -> Option<Duration> {
        let raw = headers.get("retry-after")?.to_str().ok()?.trim();
        let secs: u64 = raw.parse().ok()?;
        Some(Duration::from_secs(secs))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, path: &str, body: &serde_json::Value) -> Result<TransportResponse> {
        let client = self.client()?;
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();

        let resp = client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(Self::map_error)?;

        let status = resp.status().as_u16();
        let retry_after = Self::retry_after(resp.headers());
        let text = resp.text().await.map_err(Self::map_error)?;

        if (200..300).contains(&status) {
            debug!(
                http_status = status,
                path,
                duration_ms = start.elapsed().as_millis() as u64,
                "request completed"
            );
        } else {
            info!(
                http_status = status,
                path,
                duration_ms = start.elapsed().as_millis() as u64,
                retry_after_secs = retry_after.map(|d| d.as_secs()),
                "request failed"
            );
        }

        Ok(TransportResponse {
            status,
            body: text,
            retry_after,
        })
    }

    async fn close(&self) {
        let previous = self
            .client
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if previous.is_some() {
            debug!(base_url = %self.base_url, "http transport closed");
        }
    }
}
