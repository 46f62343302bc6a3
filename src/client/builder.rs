use super::config::EngineConfig;
use super::core::Engine;
use crate::batch::ChunkPlanner;
use crate::resilience::{RetryController, RetryObserver};
use crate::transport::{HttpTransport, Transport};
use crate::Result;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::info;

/// Builder for [`Engine`].
///
/// Setters store raw values; range checks happen once in [`build`](Self::build)
/// so the error always names the offending `config.<field>`.
pub struct EngineBuilder {
    config: EngineConfig,
    transport: Option<Arc<dyn Transport>>,
    retry_observer: Option<RetryObserver>,
}

impl EngineBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_config(EngineConfig::new(api_key))
    }

    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            transport: None,
            retry_observer: None,
        }
    }

    /// Override the service base URL (mock servers, staging).
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn batch_size(mut self, n: usize) -> Self {
        self.config.batch_size = n;
        self
    }

    pub fn ideal_batch_item_size(mut self, n: usize) -> Self {
        self.config.ideal_batch_item_size = n;
        self
    }

    /// Per-attempt request timeout in seconds.
    pub fn timeout(mut self, secs: f64) -> Self {
        self.config.timeout = secs;
        self
    }

    pub fn retry_max_attempts(mut self, n: u32) -> Self {
        self.config.retry_max_attempts = n;
        self
    }

    pub fn retry_base_delay(mut self, secs: f64) -> Self {
        self.config.retry_base_delay = secs;
        self
    }

    pub fn retry_backoff_factor(mut self, factor: f64) -> Self {
        self.config.retry_backoff_factor = factor;
        self
    }

    pub fn retry_jitter(mut self, enable: bool) -> Self {
        self.config.retry_jitter = enable;
        self
    }

    pub fn retry_max_timeout(mut self, secs: f64) -> Self {
        self.config.retry_max_timeout = secs;
        self
    }

    pub fn max_parallel(mut self, n: usize) -> Self {
        self.config.max_parallel = n;
        self
    }

    /// Limit requests in flight across every call on this engine.
    pub fn max_inflight(mut self, n: usize) -> Self {
        self.config.max_inflight = Some(n);
        self
    }

    /// Use a custom transport instead of the default HTTP client.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Called before each retry sleep with the failed attempt, its error and the delay.
    pub fn retry_observer(mut self, observer: RetryObserver) -> Self {
        self.retry_observer = Some(observer);
        self
    }

    pub fn build(self) -> Result<Engine> {
        let mut config = self.config;
        config.api_url = config.api_url.trim_end_matches('/').to_string();
        config.validate()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(
                &config.api_url,
                &config.api_key,
                config.timeout_duration(),
            )?),
        };

        let mut retry = RetryController::new(config.retry_policy());
        if let Some(observer) = self.retry_observer {
            retry = retry.with_observer(observer);
        }

        info!(
            api_url = %config.api_url,
            batch_size = config.batch_size,
            ideal_batch_item_size = config.ideal_batch_item_size,
            max_parallel = config.max_parallel,
            max_inflight = config.max_inflight,
            retry_max_attempts = config.retry_max_attempts,
            "engine created"
        );

        Ok(Engine {
            planner: ChunkPlanner::new(config.chunk_config()),
            inflight: config.max_inflight.map(|n| Arc::new(Semaphore::new(n))),
            retry,
            transport,
            closed: AtomicBool::new(false),
            config,
        })
    }
}
