//! One-shot helpers: build an engine, run one call, close it.

use super::config::EngineConfig;
use super::core::Engine;
use crate::batch::run_bounded;
use crate::types::{BatchLocalizationParams, LocalizationParams, Payload};
use crate::Result;

/// Text or object content for the one-shot helpers.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Object(Payload),
}

impl Content {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s),
            Content::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&Payload> {
        match self {
            Content::Object(o) => Some(o),
            Content::Text(_) => None,
        }
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Text(s)
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Text(s.to_string())
    }
}

impl From<Payload> for Content {
    fn from(p: Payload) -> Self {
        Content::Object(p)
    }
}

impl Engine {
    async fn localize_content(&self, content: &Content, params: &LocalizationParams) -> Result<Content> {
        match content {
            Content::Text(text) => self.localize_text(text, params).await.map(Content::Text),
            Content::Object(obj) => self.localize_object(obj, params).await.map(Content::Object),
        }
    }

    /// Translate `content` with default settings and the given API key.
    pub async fn quick_translate(
        api_key: &str,
        content: impl Into<Content>,
        params: &LocalizationParams,
    ) -> Result<Content> {
        Self::quick_translate_with_config(EngineConfig::new(api_key), content, params).await
    }

    pub async fn quick_translate_with_config(
        config: EngineConfig,
        content: impl Into<Content>,
        params: &LocalizationParams,
    ) -> Result<Content> {
        let engine = Engine::new(config)?;
        let result = engine.localize_content(&content.into(), params).await;
        engine.close().await;
        result
    }

    /// Translate `content` into every target locale; results follow `target_locales` order.
    pub async fn quick_batch_translate(
        api_key: &str,
        content: impl Into<Content>,
        params: &BatchLocalizationParams,
    ) -> Result<Vec<Content>> {
        Self::quick_batch_translate_with_config(EngineConfig::new(api_key), content, params).await
    }

    pub async fn quick_batch_translate_with_config(
        config: EngineConfig,
        content: impl Into<Content>,
        params: &BatchLocalizationParams,
    ) -> Result<Vec<Content>> {
        params.validate()?;
        let engine = Engine::new(config)?;
        let content = content.into();
        let (engine_ref, content_ref) = (&engine, &content);
        let result = run_bounded(&params.target_locales, engine.config.max_parallel, move |locale| {
            let leg = params.for_target(locale);
            async move { engine_ref.localize_content(content_ref, &leg).await }
        })
        .await
        .map_err(|(i, e)| e.in_leg(format!("target_locale={}", params.target_locales[i])));
        engine.close().await;
        result
    }
}
