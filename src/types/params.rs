//! Localization parameters and their validation.

use super::payload::Payload;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// Language subtag plus optional script/region/variant subtags: en, es, en-US, zh-Hans, sr-Latn-RS
static LOCALE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})*$").expect("locale pattern is valid")
});

/// Validate a locale code, naming `field` on failure.
pub fn validate_locale(field: &str, locale: &str) -> Result<()> {
    if locale.trim().is_empty() {
        return Err(Error::invalid_field(field, "locale code cannot be empty"));
    }
    if !LOCALE_RE.is_match(locale) {
        return Err(Error::invalid_field(
            field,
            format!(
                "invalid locale code '{}' (expected e.g. 'en', 'es', 'en-US')",
                locale
            ),
        ));
    }
    Ok(())
}

/// Parameters for one logical localization call.
///
/// Shared read-only by every chunk of the call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizationParams {
    /// `None` lets the service detect the source locale.
    #[serde(default)]
    pub source_locale: Option<String>,
    pub target_locale: String,
    #[serde(default)]
    pub fast: bool,
    /// Reference translations keyed by locale.
    #[serde(default)]
    pub reference: Option<serde_json::Map<String, serde_json::Value>>,
}

impl LocalizationParams {
    pub fn new(target_locale: impl Into<String>) -> Self {
        Self {
            target_locale: target_locale.into(),
            ..Self::default()
        }
    }

    pub fn with_source_locale(mut self, locale: impl Into<String>) -> Self {
        self.source_locale = Some(locale.into());
        self
    }

    pub fn with_fast(mut self, fast: bool) -> Self {
        self.fast = fast;
        self
    }

    /// Add reference translations for `locale`.
    pub fn with_reference(mut self, locale: impl Into<String>, translations: Payload) -> Self {
        self.reference
            .get_or_insert_with(serde_json::Map::new)
            .insert(locale.into(), serde_json::Value::Object(translations));
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(src) = &self.source_locale {
            validate_locale("params.source_locale", src)?;
        }
        validate_locale("params.target_locale", &self.target_locale)?;
        if let Some(reference) = &self.reference {
            for (locale, value) in reference {
                validate_locale("params.reference", locale)?;
                if !value.is_object() {
                    return Err(Error::invalid_field(
                        "params.reference",
                        format!("reference for '{}' must be an object", locale),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Parameters for fanning one piece of content out to several target locales.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchLocalizationParams {
    #[serde(default)]
    pub source_locale: Option<String>,
    pub target_locales: Vec<String>,
    #[serde(default)]
    pub fast: bool,
    #[serde(default)]
    pub reference: Option<serde_json::Map<String, serde_json::Value>>,
}

impl BatchLocalizationParams {
    pub fn new<I, S>(target_locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target_locales: target_locales.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_source_locale(mut self, locale: impl Into<String>) -> Self {
        self.source_locale = Some(locale.into());
        self
    }

    pub fn with_fast(mut self, fast: bool) -> Self {
        self.fast = fast;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(src) = &self.source_locale {
            validate_locale("params.source_locale", src)?;
        }
        if self.target_locales.is_empty() {
            return Err(Error::invalid_field(
                "params.target_locales",
                "at least one target locale must be specified",
            ));
        }
        let mut seen = HashSet::new();
        for locale in &self.target_locales {
            validate_locale("params.target_locales", locale)?;
            if !seen.insert(locale.to_lowercase()) {
                return Err(Error::invalid_field(
                    "params.target_locales",
                    format!("duplicate target locale '{}'", locale),
                ));
            }
        }
        Ok(())
    }

    /// Single-locale parameters for one fan-out leg.
    pub fn for_target(&self, target_locale: &str) -> LocalizationParams {
        LocalizationParams {
            source_locale: self.source_locale.clone(),
            target_locale: target_locale.to_string(),
            fast: self.fast,
            reference: self.reference.clone(),
        }
    }
}
