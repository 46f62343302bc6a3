//! 弹性模块：失败分类与带退避的重试控制。
//!
//! # Resilience Module
//!
//! Failure classification and bounded retries for chunk requests.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`classify`] | Pure `Error -> {Retryable, Fatal}` classification |
//! | [`RetryPolicy`] | Retry limits, backoff curve, jitter and time budget |
//! | [`RetryController`] | Runs one operation under a policy |
//!
//! ```rust
//! use lingo_engine::resilience::{RetryController, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new()
//!     .with_max_retries(2)
//!     .with_base_delay(Duration::from_secs(1))
//!     .with_backoff_factor(2.0)
//!     .with_jitter(false);
//! let controller = RetryController::new(policy);
//! assert_eq!(controller.policy().backoff(1), Duration::from_secs(2));
//! ```

pub mod classify;
pub mod retry;

pub use classify::{classify, is_retryable_status, Classification};
pub use retry::{RetryController, RetryObserver, RetryPolicy};
