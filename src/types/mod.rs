//! 类型模块：载荷、本地化参数与进度回调。
//!
//! # Types Module
//!
//! Core data types shared by the planner, scheduler and engine.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Payload`] | Ordered item-id → content mapping |
//! | [`ChatMessage`] | Speaker + text line of a chat transcript |
//! | [`LocalizationParams`] | Source/target locale, fast mode, references |
//! | [`BatchLocalizationParams`] | One source, many target locales |
//! | [`ProgressCallback`] | Simple or detailed progress reporting |
//! | [`Identity`] | Account returned by the identity check |
//!
//! ## Example
//!
//! ```rust
//! use lingo_engine::types::{LocalizationParams, Payload};
//!
//! let params = LocalizationParams::new("es").with_source_locale("en");
//! assert!(params.validate().is_ok());
//!
//! let mut payload = Payload::new();
//! payload.insert("greeting".into(), "Hello".into());
//! ```

pub mod params;
pub mod payload;
pub mod progress;

pub use params::{validate_locale, BatchLocalizationParams, LocalizationParams};
pub use payload::{word_count, ChatMessage, Identity, Payload};
pub use progress::{percent_complete, ProgressCallback, ProgressEvent};
