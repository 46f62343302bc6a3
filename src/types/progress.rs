//! Progress reporting for ordered (sequential) calls.

use super::payload::Payload;

/// Caller-supplied progress callback.
///
/// The variant is chosen once, when the callback is constructed, and decides
/// which arguments every invocation receives.
pub enum ProgressCallback<'a> {
    /// Receives the completion percentage only.
    Simple(Box<dyn FnMut(u8) + Send + 'a>),
    /// Receives the percentage, the source chunk and the translated chunk.
    Detailed(Box<dyn FnMut(u8, &Payload, &Payload) + Send + 'a>),
}

impl<'a> ProgressCallback<'a> {
    pub fn simple<F>(f: F) -> Self
    where
        F: FnMut(u8) + Send + 'a,
    {
        ProgressCallback::Simple(Box::new(f))
    }

    pub fn detailed<F>(f: F) -> Self
    where
        F: FnMut(u8, &Payload, &Payload) + Send + 'a,
    {
        ProgressCallback::Detailed(Box::new(f))
    }

    pub(crate) fn report(&mut self, event: &ProgressEvent<'_>) {
        match self {
            ProgressCallback::Simple(f) => f(event.percent),
            ProgressCallback::Detailed(f) => f(event.percent, event.source, event.processed),
        }
    }
}

impl std::fmt::Debug for ProgressCallback<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressCallback::Simple(_) => f.write_str("ProgressCallback::Simple"),
            ProgressCallback::Detailed(_) => f.write_str("ProgressCallback::Detailed"),
        }
    }
}

/// One progress notification, emitted after a chunk completes.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent<'c> {
    pub percent: u8,
    pub completed: usize,
    pub total: usize,
    pub source: &'c Payload,
    pub processed: &'c Payload,
}

/// `round(completed / total * 100)`, clamped to 0..=100.
pub fn percent_complete(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let completed = completed.min(total);
    ((completed * 100 + total / 2) / total) as u8
}
