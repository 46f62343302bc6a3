//! Engine configuration.

use crate::batch::ChunkConfig;
use crate::resilience::RetryPolicy;
use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://engine.lingo.dev";

/// Engine configuration. Validated by [`validate`](Self::validate) before the engine is built.
#[derive(Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub api_key: String,
    pub api_url: String,
    /// Maximum items per chunk, `1..=250`.
    pub batch_size: usize,
    /// Target words per chunk, `1..=2500`.
    pub ideal_batch_item_size: usize,
    /// Per-attempt request timeout in seconds, `1..=300`.
    pub timeout: f64,
    /// Retries after the first attempt, `0..=10`.
    pub retry_max_attempts: u32,
    /// Seconds before the first retry, `0.1..=10.0`.
    pub retry_base_delay: f64,
    /// `1.0..=10.0`.
    pub retry_backoff_factor: f64,
    pub retry_jitter: bool,
    /// Wall-clock budget in seconds for one chunk's attempts, `1..=300`.
    pub retry_max_timeout: f64,
    /// Chunks in flight per concurrent call, `1..=64`.
    pub max_parallel: usize,
    /// Optional cap on requests in flight across the whole engine.
    pub max_inflight: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            batch_size: 25,
            ideal_batch_item_size: 250,
            timeout: 30.0,
            retry_max_attempts: 3,
            retry_base_delay: 0.5,
            retry_backoff_factor: 2.0,
            retry_jitter: true,
            retry_max_timeout: 60.0,
            max_parallel: 5,
            max_inflight: None,
        }
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("batch_size", &self.batch_size)
            .field("ideal_batch_item_size", &self.ideal_batch_item_size)
            .field("timeout", &self.timeout)
            .field("retry_max_attempts", &self.retry_max_attempts)
            .field("retry_base_delay", &self.retry_base_delay)
            .field("retry_backoff_factor", &self.retry_backoff_factor)
            .field("retry_jitter", &self.retry_jitter)
            .field("retry_max_timeout", &self.retry_max_timeout)
            .field("max_parallel", &self.max_parallel)
            .field("max_inflight", &self.max_inflight)
            .finish()
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}

impl EngineConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Load from `LINGODOTDEV_*` environment variables.
    ///
    /// `LINGODOTDEV_API_KEY` is required. Other variables are optional; values
    /// that do not parse are ignored. The result is validated.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("LINGODOTDEV_API_KEY").map_err(|_| {
            Error::invalid_field(
                "config.api_key",
                "LINGODOTDEV_API_KEY is not set",
            )
        })?;
        let mut cfg = Self::new(api_key);
        if let Ok(url) = env::var("LINGODOTDEV_API_URL") {
            cfg.api_url = url;
        }
        if let Some(v) = env_parse("LINGODOTDEV_BATCH_SIZE") {
            cfg.batch_size = v;
        }
        if let Some(v) = env_parse("LINGODOTDEV_IDEAL_BATCH_ITEM_SIZE") {
            cfg.ideal_batch_item_size = v;
        }
        if let Some(v) = env_parse("LINGODOTDEV_TIMEOUT_SECS") {
            cfg.timeout = v;
        }
        if let Some(v) = env_parse("LINGODOTDEV_RETRY_MAX_ATTEMPTS") {
            cfg.retry_max_attempts = v;
        }
        if let Some(v) = env_parse("LINGODOTDEV_RETRY_BASE_DELAY") {
            cfg.retry_base_delay = v;
        }
        if let Some(v) = env_parse("LINGODOTDEV_RETRY_MAX_TIMEOUT") {
            cfg.retry_max_timeout = v;
        }
        if let Some(v) = env_parse("LINGODOTDEV_MAX_PARALLEL") {
            cfg.max_parallel = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every field; the error names the first offending one.
    pub fn validate(&self) -> Result<()> {
        super::validation::validate_config(self)
    }

    /// Request timeout. Call after [`validate`](Self::validate).
    pub fn timeout_duration(&self) -> Duration {
        secs(self.timeout, Duration::from_secs(30))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_retries: self.retry_max_attempts,
            base_delay: secs(self.retry_base_delay, defaults.base_delay),
            backoff_factor: self.retry_backoff_factor,
            jitter: self.retry_jitter,
            max_total_timeout: secs(self.retry_max_timeout, defaults.max_total_timeout),
        }
    }

    pub fn chunk_config(&self) -> ChunkConfig {
        ChunkConfig::new()
            .with_max_items_per_chunk(self.batch_size)
            .with_target_chunk_size(self.ideal_batch_item_size)
    }
}

fn secs(value: f64, fallback: Duration) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(fallback)
}
