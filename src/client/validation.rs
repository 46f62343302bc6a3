//! 配置校验：在首次请求前检查引擎配置的每个字段。
//!
//! Configuration validation.

use super::config::EngineConfig;
use crate::types::ChatMessage;
use crate::{Error, ErrorContext, Result};

fn out_of_range(field: &str, expected: &str, actual: impl std::fmt::Display) -> Error {
    Error::validation_with_context(
        format!("{} must be {}", field.trim_start_matches("config."), expected),
        ErrorContext::new()
            .with_field_path(field)
            .with_details(format!("got {}", actual))
            .with_source("config_validator"),
    )
}

fn check_usize(field: &str, value: usize, min: usize, max: usize) -> Result<()> {
    if value < min || value > max {
        return Err(out_of_range(
            field,
            &format!("between {} and {}", min, max),
            value,
        ));
    }
    Ok(())
}

fn check_f64(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(out_of_range(
            field,
            &format!("between {} and {}", min, max),
            value,
        ));
    }
    Ok(())
}

fn validate_api_url(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url).map_err(|e| {
        Error::validation_with_context(
            "api_url must be a valid HTTP/HTTPS URL",
            ErrorContext::new()
                .with_field_path("config.api_url")
                .with_details(format!("{}: {}", url, e))
                .with_source("config_validator"),
        )
    })?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(Error::validation_with_context(
            "api_url must be a valid HTTP/HTTPS URL",
            ErrorContext::new()
                .with_field_path("config.api_url")
                .with_details(url.to_string())
                .with_source("config_validator"),
        ));
    }
    Ok(())
}

/// Validate every configuration field before the engine touches the network.
pub(crate) fn validate_config(cfg: &EngineConfig) -> Result<()> {
    if cfg.api_key.trim().is_empty() {
        return Err(Error::validation_with_context(
            "api_key cannot be empty",
            ErrorContext::new()
                .with_field_path("config.api_key")
                .with_source("config_validator"),
        ));
    }
    validate_api_url(&cfg.api_url)?;
    check_usize("config.batch_size", cfg.batch_size, 1, 250)?;
    check_usize(
        "config.ideal_batch_item_size",
        cfg.ideal_batch_item_size,
        1,
        2500,
    )?;
    check_f64("config.timeout", cfg.timeout, 1.0, 300.0)?;
    if cfg.retry_max_attempts > 10 {
        return Err(out_of_range(
            "config.retry_max_attempts",
            "between 0 and 10",
            cfg.retry_max_attempts,
        ));
    }
    check_f64("config.retry_base_delay", cfg.retry_base_delay, 0.1, 10.0)?;
    check_f64(
        "config.retry_backoff_factor",
        cfg.retry_backoff_factor,
        1.0,
        10.0,
    )?;
    check_f64("config.retry_max_timeout", cfg.retry_max_timeout, 1.0, 300.0)?;
    check_usize("config.max_parallel", cfg.max_parallel, 1, 64)?;
    if let Some(n) = cfg.max_inflight {
        check_usize("config.max_inflight", n, 1, usize::MAX)?;
    }
    cfg.retry_policy().validate()
}

/// Every chat message needs a speaker and some text.
pub(crate) fn validate_chat(chat: &[ChatMessage]) -> Result<()> {
    for (i, message) in chat.iter().enumerate() {
        if message.name.trim().is_empty() {
            return Err(Error::invalid_field(
                &format!("chat[{}].name", i),
                "speaker name cannot be empty",
            ));
        }
        if message.text.trim().is_empty() {
            return Err(Error::invalid_field(
                &format!("chat[{}].text", i),
                "message text cannot be empty",
            ));
        }
    }
    Ok(())
}
