use super::builder::EngineBuilder;
use super::config::EngineConfig;
use super::validation::validate_chat;
use super::wire;
use crate::batch::{
    assemble, assemble_chat, assemble_text, chat_payload, run_bounded, text_payload,
    BatchExecutor, Chunk, ChunkPlanner, ExecutionMode,
};
use crate::resilience::RetryController;
use crate::transport::{Transport, TransportResponse};
use crate::types::{
    percent_complete, BatchLocalizationParams, ChatMessage, Identity, LocalizationParams, Payload,
    ProgressCallback, ProgressEvent,
};
use crate::{Error, ErrorContext, Result};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info};
use uuid::Uuid;

/// Localization engine.
///
/// Owns one transport (and its connection pool) for its whole life. Every
/// operation validates its input before the first request, splits content into
/// chunks, sends each chunk through the retry controller and merges the
/// results back into the caller's shape.
///
/// Plain operations send chunks with up to `max_parallel` requests in flight.
/// `_ordered` operations send one chunk at a time and accept a progress callback.
pub struct Engine {
    pub(crate) config: EngineConfig,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) planner: ChunkPlanner,
    pub(crate) retry: RetryController,
    pub(crate) inflight: Option<Arc<Semaphore>>,
    pub(crate) closed: AtomicBool,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("retry", &self.retry)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Engine {
    /// Build an engine from a validated configuration with the default HTTP transport.
    pub fn new(config: EngineConfig) -> Result<Self> {
        EngineBuilder::from_config(config).build()
    }

    pub fn builder(api_key: impl Into<String>) -> EngineBuilder {
        EngineBuilder::new(api_key)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Release the transport. Every later call fails with [`Error::Configuration`].
    pub async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.transport.close().await;
            info!(api_url = %self.config.api_url, "engine closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::configuration_with_context(
                "engine is closed",
                ErrorContext::new().with_source("engine"),
            ));
        }
        Ok(())
    }

    fn concurrent(&self) -> ExecutionMode {
        ExecutionMode::Concurrent {
            max_parallel: self.config.max_parallel,
        }
    }

    // ---- content operations ----

    pub async fn localize_object(&self, obj: &Payload, params: &LocalizationParams) -> Result<Payload> {
        self.localize_raw(obj, params, self.concurrent(), None).await
    }

    pub async fn localize_object_ordered(
        &self,
        obj: &Payload,
        params: &LocalizationParams,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<Payload> {
        self.localize_raw(obj, params, ExecutionMode::Sequential, progress)
            .await
    }

    pub async fn localize_text(&self, text: &str, params: &LocalizationParams) -> Result<String> {
        let out = self
            .localize_raw(&text_payload(text), params, self.concurrent(), None)
            .await?;
        Ok(assemble_text(&out))
    }

    pub async fn localize_text_ordered(
        &self,
        text: &str,
        params: &LocalizationParams,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<String> {
        let out = self
            .localize_raw(&text_payload(text), params, ExecutionMode::Sequential, progress)
            .await?;
        Ok(assemble_text(&out))
    }

    /// Translate message texts; speaker names are kept and never sent.
    pub async fn localize_chat(
        &self,
        chat: &[ChatMessage],
        params: &LocalizationParams,
    ) -> Result<Vec<ChatMessage>> {
        validate_chat(chat)?;
        let out = self
            .localize_raw(&chat_payload(chat), params, self.concurrent(), None)
            .await?;
        Ok(assemble_chat(chat, &out))
    }

    pub async fn localize_chat_ordered(
        &self,
        chat: &[ChatMessage],
        params: &LocalizationParams,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<Vec<ChatMessage>> {
        validate_chat(chat)?;
        let out = self
            .localize_raw(&chat_payload(chat), params, ExecutionMode::Sequential, progress)
            .await?;
        Ok(assemble_chat(chat, &out))
    }

    /// Translate one text into every target locale. Results follow `target_locales` order.
    pub async fn batch_localize_text(
        &self,
        text: &str,
        params: &BatchLocalizationParams,
    ) -> Result<Vec<String>> {
        self.ensure_open()?;
        params.validate()?;
        run_bounded(&params.target_locales, self.config.max_parallel, move |locale| {
            let leg = params.for_target(locale);
            async move { self.localize_text(text, &leg).await }
        })
        .await
        .map_err(|(i, e)| e.in_leg(format!("target_locale={}", params.target_locales[i])))
    }

    /// Like [`batch_localize_text`](Self::batch_localize_text), one locale at a time.
    /// Progress is reported once per completed locale.
    pub async fn batch_localize_text_ordered(
        &self,
        text: &str,
        params: &BatchLocalizationParams,
        mut progress: Option<ProgressCallback<'_>>,
    ) -> Result<Vec<String>> {
        self.ensure_open()?;
        params.validate()?;
        let source = text_payload(text);
        let total = params.target_locales.len();
        let mut results = Vec::with_capacity(total);
        for (i, locale) in params.target_locales.iter().enumerate() {
            let translated = self
                .localize_text_ordered(text, &params.for_target(locale), None)
                .await?;
            if let Some(cb) = progress.as_mut() {
                cb.report(&ProgressEvent {
                    percent: percent_complete(i + 1, total),
                    completed: i + 1,
                    total,
                    source: &source,
                    processed: &text_payload(&translated),
                });
            }
            results.push(translated);
        }
        Ok(results)
    }

    /// Translate several objects into one locale. Results follow input order.
    pub async fn batch_localize_objects(
        &self,
        objects: &[Payload],
        params: &LocalizationParams,
    ) -> Result<Vec<Payload>> {
        self.ensure_open()?;
        params.validate()?;
        run_bounded(objects, self.config.max_parallel, move |obj| {
            self.localize_object(obj, params)
        })
        .await
        .map_err(|(i, e)| e.in_leg(format!("object_index={i}")))
    }

    pub async fn batch_localize_objects_ordered(
        &self,
        objects: &[Payload],
        params: &LocalizationParams,
        mut progress: Option<ProgressCallback<'_>>,
    ) -> Result<Vec<Payload>> {
        self.ensure_open()?;
        params.validate()?;
        let total = objects.len();
        let mut results = Vec::with_capacity(total);
        for (i, obj) in objects.iter().enumerate() {
            let translated = self.localize_object_ordered(obj, params, None).await?;
            if let Some(cb) = progress.as_mut() {
                cb.report(&ProgressEvent {
                    percent: percent_complete(i + 1, total),
                    completed: i + 1,
                    total,
                    source: obj,
                    processed: &translated,
                });
            }
            results.push(translated);
        }
        Ok(results)
    }

    // ---- auxiliary operations ----

    /// Detect the locale of `text`. Returns an empty string when the service cannot tell.
    pub async fn recognize_locale(&self, text: &str) -> Result<String> {
        self.ensure_open()?;
        if text.trim().is_empty() {
            return Err(Error::invalid_field("text", "text cannot be empty"));
        }
        let body = wire::recognize_request(text);
        let body = &body;
        self.retry
            .execute(move |_| async move {
                wire::recognize_response(self.send(wire::RECOGNIZE_PATH, body).await?)
            })
            .await
    }

    /// Account behind the API key, or `None` when the key is not authenticated.
    ///
    /// Client errors (4xx other than 429) map to `None`; server and network
    /// failures propagate after retries.
    pub async fn whoami(&self) -> Result<Option<Identity>> {
        self.ensure_open()?;
        let body = Value::Object(Payload::new());
        let body = &body;
        let outcome = self
            .retry
            .execute(move |_| async move {
                wire::whoami_response(self.send(wire::WHOAMI_PATH, body).await?)
            })
            .await;
        match outcome {
            Err(Error::Api { status, .. })
                if (400..500).contains(&status) && !crate::resilience::is_retryable_status(status) =>
            {
                debug!(http_status = status, "identity check rejected");
                Ok(None)
            }
            other => other,
        }
    }

    // ---- internals ----

    async fn localize_raw(
        &self,
        payload: &Payload,
        params: &LocalizationParams,
        mode: ExecutionMode,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<Payload> {
        self.ensure_open()?;
        params.validate()?;

        let chunks = self.planner.plan(payload);
        if chunks.is_empty() {
            return Ok(Payload::new());
        }

        let workflow_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        let wf = workflow_id.as_str();
        let results = BatchExecutor::new(mode)
            .run(&chunks, |chunk| self.localize_chunk(wf, params, chunk), progress)
            .await?;

        debug!(
            workflow_id = %workflow_id,
            chunks = chunks.len(),
            target_locale = %params.target_locale,
            duration_ms = start.elapsed().as_millis() as u64,
            "localization finished"
        );
        Ok(assemble(payload, results))
    }

    async fn localize_chunk(
        &self,
        workflow_id: &str,
        params: &LocalizationParams,
        chunk: &Chunk,
    ) -> Result<Payload> {
        let body = wire::localize_request(workflow_id, params, &chunk.items);
        let body = &body;
        debug!(
            workflow_id,
            chunk_index = chunk.index,
            items = chunk.item_count(),
            words = chunk.size,
            "sending chunk"
        );
        self.retry
            .execute(move |_| async move {
                wire::localize_response(self.send(wire::LOCALIZE_PATH, body).await?)
            })
            .await
    }

    /// One request, gated by the engine-wide in-flight limit when configured.
    async fn send(&self, path: &str, body: &Value) -> Result<TransportResponse> {
        self.ensure_open()?;
        let _permit: Option<OwnedSemaphorePermit> = match &self.inflight {
            Some(sem) => Some(sem.clone().acquire_owned().await.map_err(|_| {
                Error::configuration_with_context(
                    "in-flight limiter closed",
                    ErrorContext::new().with_source("engine"),
                )
            })?),
            None => None,
        };
        self.transport.post(path, body).await
    }
}
