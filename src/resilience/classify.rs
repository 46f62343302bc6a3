//! Failure classification.
//!
//! The single place that decides whether a failure is worth another attempt.
//! Consumed by [`RetryController`](super::retry::RetryController) and exposed
//! through [`Error::classification`](crate::Error::classification).

use crate::error::NetworkErrorKind;
use crate::Error;

/// Outcome class of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Transient: 5xx, 429, transport timeout/connection failure.
    Retryable,
    /// Non-transient: everything else, including unrecognized failures.
    Fatal,
}

/// Whether an HTTP status is transient.
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

/// Classify a failure. Unknown shapes fail closed.
pub fn classify(err: &Error) -> Classification {
    match err {
        Error::Api { status, .. } if is_retryable_status(*status) => Classification::Retryable,
        Error::Network {
            kind: NetworkErrorKind::Timeout | NetworkErrorKind::Connection,
            ..
        } => Classification::Retryable,
        _ => Classification::Fatal,
    }
}
