//! Blocking facade over [`Engine`] for callers without an async runtime.

use super::config::EngineConfig;
use super::core::Engine;
use crate::types::{
    BatchLocalizationParams, ChatMessage, Identity, LocalizationParams, Payload, ProgressCallback,
};
use crate::{Error, ErrorContext, Result};
use tokio::runtime::{Builder, Runtime};

/// Runs every operation to completion on a private current-thread runtime.
///
/// Chunks are sent one at a time (the `_ordered` forms), so progress callbacks
/// are accepted everywhere. Must not be used from inside another tokio runtime.
pub struct BlockingEngine {
    engine: Engine,
    runtime: Runtime,
}

impl BlockingEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let runtime = Self::runtime()?;
        let engine = {
            let _guard = runtime.enter();
            Engine::new(config)?
        };
        Ok(Self { engine, runtime })
    }

    pub fn from_engine(engine: Engine) -> Result<Self> {
        Ok(Self {
            engine,
            runtime: Self::runtime()?,
        })
    }

    fn runtime() -> Result<Runtime> {
        Builder::new_current_thread().enable_all().build().map_err(|e| {
            Error::configuration_with_context(
                "failed to start runtime",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("blocking_engine"),
            )
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn localize_text(
        &self,
        text: &str,
        params: &LocalizationParams,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<String> {
        self.runtime
            .block_on(self.engine.localize_text_ordered(text, params, progress))
    }

    pub fn localize_object(
        &self,
        obj: &Payload,
        params: &LocalizationParams,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<Payload> {
        self.runtime
            .block_on(self.engine.localize_object_ordered(obj, params, progress))
    }

    pub fn localize_chat(
        &self,
        chat: &[ChatMessage],
        params: &LocalizationParams,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<Vec<ChatMessage>> {
        self.runtime
            .block_on(self.engine.localize_chat_ordered(chat, params, progress))
    }

    pub fn batch_localize_text(
        &self,
        text: &str,
        params: &BatchLocalizationParams,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<Vec<String>> {
        self.runtime
            .block_on(self.engine.batch_localize_text_ordered(text, params, progress))
    }

    pub fn batch_localize_objects(
        &self,
        objects: &[Payload],
        params: &LocalizationParams,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<Vec<Payload>> {
        self.runtime
            .block_on(self.engine.batch_localize_objects_ordered(objects, params, progress))
    }

    pub fn recognize_locale(&self, text: &str) -> Result<String> {
        self.runtime.block_on(self.engine.recognize_locale(text))
    }

    pub fn whoami(&self) -> Result<Option<Identity>> {
        self.runtime.block_on(self.engine.whoami())
    }

    pub fn close(&self) {
        self.runtime.block_on(self.engine.close())
    }
}
