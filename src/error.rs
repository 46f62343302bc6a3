use crate::resilience::classify::{classify, Classification};
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Structured error context for diagnosing failures without re-running with verbose logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// When the failure was observed.
    pub timestamp: SystemTime,
    /// Field path or configuration key that caused the error (e.g., "config.batch_size", "params.target_locale")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected range, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_validator", "retry_controller")
    pub source: Option<String>,
    /// Chunk the failure belongs to, when raised during a chunked call
    pub chunk_index: Option<usize>,
    /// 1-based attempt number that produced the failure
    pub attempt: Option<u32>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            timestamp: SystemTime::now(),
            field_path: None,
            details: None,
            source: None,
            chunk_index: None,
            attempt: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_chunk_index(mut self, index: usize) -> Self {
        self.chunk_index = Some(index);
        self
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    Timeout,
    Connection,
    Other,
}

impl std::fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NetworkErrorKind::Timeout => "timeout",
            NetworkErrorKind::Connection => "connection",
            NetworkErrorKind::Other => "other",
        };
        f.write_str(s)
    }
}

/// Unified error type for the localization engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("API error: HTTP {status}: {message}{}", format_context(.context))]
    Api {
        status: u16,
        message: String,
        body: String,
        retry_after: Option<Duration>,
        suggestions: Vec<String>,
        context: ErrorContext,
    },

    #[error("Network error ({kind}): {message}{}", format_context(.context))]
    Network {
        kind: NetworkErrorKind,
        message: String,
        context: ErrorContext,
    },

    #[error("Service error: {message}{}", format_context(.context))]
    Service {
        message: String,
        context: ErrorContext,
    },

    #[error("Retries exhausted after {attempts} attempt(s) over {:.2}s: {last}", .elapsed.as_secs_f64())]
    RetryExhausted {
        attempts: u32,
        elapsed: Duration,
        last: Box<Error>,
        context: ErrorContext,
    },

    #[error("Chunk {chunk_index} of {total_chunks} failed: {source}")]
    PartialBatch {
        chunk_index: usize,
        total_chunks: usize,
        #[source]
        source: Box<Error>,
        context: ErrorContext,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if let Some(index) = ctx.chunk_index {
        parts.push(format!("chunk: {}", index));
    }
    if let Some(attempt) = ctx.attempt {
        parts.push(format!("attempt: {}", attempt));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Shorthand for a validation failure on a named field.
    pub fn invalid_field(field: &str, msg: impl Into<String>) -> Self {
        Error::validation_with_context(
            msg,
            ErrorContext::new()
                .with_field_path(field)
                .with_source("validator"),
        )
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn network(kind: NetworkErrorKind, msg: impl Into<String>) -> Self {
        Error::Network {
            kind,
            message: msg.into(),
            context: ErrorContext::new().with_source("transport"),
        }
    }

    pub fn service(msg: impl Into<String>) -> Self {
        Error::Service {
            message: msg.into(),
            context: ErrorContext::new().with_source("response_decoder"),
        }
    }

    /// Build an API error from a non-success HTTP status and raw response body.
    pub fn api(status: u16, body: impl Into<String>, retry_after: Option<Duration>) -> Self {
        let body = body.into();
        let message = match status {
            401 => "Authentication failed - invalid or expired API key".to_string(),
            403 => "Access forbidden - insufficient permissions".to_string(),
            404 => "API endpoint not found".to_string(),
            429 => "Rate limit exceeded - too many requests".to_string(),
            500..=599 => format!("Server error ({}) - service temporarily unavailable", status),
            _ => format!("API request failed with status {}", status),
        };
        let suggestions = suggestions_for_status(status, &body);
        Error::Api {
            status,
            message,
            body,
            retry_after,
            suggestions,
            context: ErrorContext::new().with_source("transport"),
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Validation { context, .. }
            | Error::Configuration { context, .. }
            | Error::Api { context, .. }
            | Error::Network { context, .. }
            | Error::Service { context, .. }
            | Error::RetryExhausted { context, .. }
            | Error::PartialBatch { context, .. } => Some(context),
            Error::Serialization(_) => None,
        }
    }

    fn context_mut(&mut self) -> Option<&mut ErrorContext> {
        match self {
            Error::Validation { context, .. }
            | Error::Configuration { context, .. }
            | Error::Api { context, .. }
            | Error::Network { context, .. }
            | Error::Service { context, .. }
            | Error::RetryExhausted { context, .. }
            | Error::PartialBatch { context, .. } => Some(context),
            Error::Serialization(_) => None,
        }
    }

    /// Attach chunk/attempt information to the error's context in place.
    pub(crate) fn annotate(mut self, chunk_index: Option<usize>, attempt: Option<u32>) -> Self {
        if let Some(ctx) = self.context_mut() {
            if let Some(i) = chunk_index {
                ctx.chunk_index = Some(i);
            }
            if let Some(a) = attempt {
                ctx.attempt = Some(a);
            }
        }
        self
    }

    /// Prefix the context details with the batch leg that failed, e.g. `target_locale=fr`.
    pub(crate) fn in_leg(mut self, leg: impl Into<String>) -> Self {
        let leg = leg.into();
        if let Some(ctx) = self.context_mut() {
            ctx.details = Some(match ctx.details.take() {
                Some(details) => format!("{leg}; {details}"),
                None => leg,
            });
        }
        self
    }

    /// Retry classification of this failure (see [`classify`]).
    pub fn classification(&self) -> Classification {
        classify(self)
    }

    pub fn is_retryable(&self) -> bool {
        self.classification() == Classification::Retryable
    }

    /// HTTP status of the underlying API failure, looking through wrappers.
    pub fn status_code(&self) -> Option<u16> {
        match self.root_cause() {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The innermost failure behind `RetryExhausted` / `PartialBatch` wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::RetryExhausted { last, .. } => last.root_cause(),
            Error::PartialBatch { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Total attempts made, when the failure went through the retry controller.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Error::RetryExhausted { attempts, .. } => Some(*attempts),
            Error::PartialBatch { source, .. } => source.attempts(),
            _ => None,
        }
    }

    /// Hints for resolving the failure.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Error::Api { suggestions, .. } => suggestions.clone(),
            Error::Network { kind, .. } => match kind {
                NetworkErrorKind::Timeout => vec![
                    "The request timed out - check your internet connection".into(),
                    "Consider increasing the timeout value in your configuration".into(),
                    "Try breaking large requests into smaller chunks".into(),
                ],
                NetworkErrorKind::Connection => vec![
                    "Unable to connect to the API - check your internet connection".into(),
                    "Verify that the API URL is correct".into(),
                    "Check if there are any firewall or proxy issues".into(),
                ],
                NetworkErrorKind::Other => vec![
                    "A network error occurred - check your network configuration".into(),
                ],
            },
            Error::RetryExhausted { attempts, last, .. } => {
                let mut out = vec![
                    format!("All {} attempts failed", attempts),
                    "Consider increasing the retry limit or backoff time".into(),
                ];
                out.extend(last.suggestions());
                out
            }
            Error::PartialBatch { source, .. } => source.suggestions(),
            Error::Validation { context, .. } | Error::Configuration { context, .. } => {
                match &context.field_path {
                    Some(field) => vec![format!("Check the '{}' setting", field)],
                    None => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }
}

fn suggestions_for_status(status: u16, body: &str) -> Vec<String> {
    match status {
        401 => vec![
            "Check that your API key is correct and properly formatted".into(),
            "Verify that your API key hasn't expired".into(),
            "Make sure you're using the correct API endpoint".into(),
        ],
        403 => vec![
            "Check if your API key has the required permissions".into(),
            "Verify that your account has access to the requested feature".into(),
        ],
        429 => vec![
            "You've hit the rate limit - wait before making more requests".into(),
            "Lower max_parallel to reduce request bursts".into(),
        ],
        500..=599 => vec![
            "This is a server error - try again in a few moments".into(),
            "If the problem persists, check the service status page".into(),
        ],
        400 => {
            let lower = body.to_lowercase();
            let mut out = Vec::new();
            if lower.contains("locale") {
                out.push("Check that your locale codes are valid (e.g., 'en', 'es', 'fr')".into());
            }
            if lower.contains("format") {
                out.push("Verify that your request data is properly formatted".into());
            }
            if out.is_empty() {
                out.push("Check your request parameters and data format".into());
            }
            out
        }
        _ => Vec::new(),
    }
}
