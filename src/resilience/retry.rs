//! Retry controller: bounded retries with exponential backoff, jitter and a
//! wall-clock budget for a single chunk send.

use super::classify::{classify, Classification};
use crate::{Error, ErrorContext, Result};
use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use tokio::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Configuration for retry logic.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. `0` disables retries.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Multiplier applied per retry.
    pub backoff_factor: f64,
    /// Add `uniform(0, delay)` on top of the computed delay.
    pub jitter: bool,
    /// Hard ceiling on the time spent in one `execute` call, waits included.
    pub max_total_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            backoff_factor: 2.0,
            jitter: true,
            max_total_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single attempt, no retries.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    pub fn with_base_delay(mut self, d: Duration) -> Self {
        self.base_delay = d;
        self
    }

    pub fn with_backoff_factor(mut self, f: f64) -> Self {
        self.backoff_factor = f;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_max_total_timeout(mut self, d: Duration) -> Self {
        self.max_total_timeout = d;
        self
    }

    /// Validate ranges. Field names match the engine configuration keys.
    pub fn validate(&self) -> Result<()> {
        if self.max_retries > 10 {
            return Err(range_error(
                "config.retry_max_attempts",
                "must be between 0 and 10",
                self.max_retries,
            ));
        }
        let base = self.base_delay.as_secs_f64();
        if !(0.1..=10.0).contains(&base) {
            return Err(range_error(
                "config.retry_base_delay",
                "must be between 0.1 and 10.0 seconds",
                base,
            ));
        }
        if !self.backoff_factor.is_finite() || !(1.0..=10.0).contains(&self.backoff_factor) {
            return Err(range_error(
                "config.retry_backoff_factor",
                "must be between 1.0 and 10.0",
                self.backoff_factor,
            ));
        }
        let total = self.max_total_timeout.as_secs_f64();
        if !(1.0..=300.0).contains(&total) {
            return Err(range_error(
                "config.retry_max_timeout",
                "must be between 1 and 300 seconds",
                total,
            ));
        }
        Ok(())
    }

    /// Deterministic part of the delay before retry number `attempt_index + 1`:
    /// `base_delay * backoff_factor^attempt_index`.
    ///
    /// Total for any field values: a factor below `1.0` (or NaN) counts as `1.0`
    /// and the result is capped at twice the time budget.
    pub fn backoff(&self, attempt_index: u32) -> Duration {
        let cap = self.max_total_timeout.saturating_mul(2);
        let exp = i32::try_from(attempt_index).unwrap_or(i32::MAX);
        let secs = self.base_delay.as_secs_f64() * self.backoff_factor.max(1.0).powi(exp);
        Duration::try_from_secs_f64(secs).map_or(cap, |d| d.min(cap))
    }
}

fn range_error(field: &str, msg: &str, actual: impl std::fmt::Display) -> Error {
    Error::validation_with_context(
        format!("{} {}", field.trim_start_matches("config."), msg),
        ErrorContext::new()
            .with_field_path(field)
            .with_details(format!("got {}", actual))
            .with_source("retry_policy"),
    )
}

/// Called before each retry sleep with the failed attempt number, its error and the chosen delay.
pub type RetryObserver = Arc<dyn Fn(u32, &Error, Duration) + Send + Sync>;

/// Runs an operation under a [`RetryPolicy`].
///
/// Every attempt is a fresh call of the operation; nothing is cached between attempts.
/// Retry state (attempt counter, elapsed time, last failure) lives on the stack of
/// [`execute`](Self::execute) and is never shared.
#[derive(Clone)]
pub struct RetryController {
    policy: RetryPolicy,
    observer: Option<RetryObserver>,
}

impl std::fmt::Debug for RetryController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryController")
            .field("policy", &self.policy)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl RetryController {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: RetryObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Delay after a retryable failure. A server retry-after wins over backoff.
    fn next_delay(&self, attempt_index: u32, err: &Error) -> Duration {
        if let Error::Api {
            retry_after: Some(after),
            ..
        } = err
        {
            return *after;
        }
        let delay = self.policy.backoff(attempt_index);
        if self.policy.jitter && !delay.is_zero() {
            let r: f64 = rand::thread_rng().gen_range(0.0..1.0);
            let extra = Duration::try_from_secs_f64(delay.as_secs_f64() * r).unwrap_or_default();
            delay.saturating_add(extra)
        } else {
            delay
        }
    }

    /// Execute `operation` until it succeeds, fails fatally, or the policy is exhausted.
    ///
    /// `operation` receives the 1-based attempt number.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let start = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let err = match operation(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        info!(
                            attempt,
                            elapsed_ms = start.elapsed().as_millis() as u64,
                            "request succeeded after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(e) => e.annotate(None, Some(attempt)),
            };

            if classify(&err) == Classification::Fatal {
                debug!(attempt, error = %err, "fatal failure, not retrying");
                return Err(err);
            }

            let elapsed = start.elapsed();
            if attempt > self.policy.max_retries {
                error!(
                    attempts = attempt,
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %err,
                    "all retry attempts exhausted"
                );
                return Err(exhausted(attempt, elapsed, err, "retry limit reached"));
            }

            let delay = self.next_delay(attempt - 1, &err);
            // Retry-after comes from the server and may be arbitrarily large.
            if delay >= self.policy.max_total_timeout.saturating_sub(elapsed) {
                warn!(
                    attempts = attempt,
                    elapsed_ms = elapsed.as_millis() as u64,
                    delay_ms = delay.as_millis() as u64,
                    budget_ms = self.policy.max_total_timeout.as_millis() as u64,
                    "next retry would exceed the time budget"
                );
                return Err(exhausted(attempt, elapsed, err, "time budget exceeded"));
            }

            warn!(
                attempt,
                max_attempts = self.policy.max_retries + 1,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "attempt failed, retrying"
            );
            if let Some(observer) = &self.observer {
                observer(attempt, &err, delay);
            }
            tokio::time::sleep(delay).await;
        }
    }
}

fn exhausted(attempts: u32, elapsed: Duration, last: Error, why: &str) -> Error {
    Error::RetryExhausted {
        attempts,
        elapsed,
        last: Box::new(last),
        context: ErrorContext::new()
            .with_attempt(attempts)
            .with_details(why)
            .with_source("retry_controller"),
    }
}
