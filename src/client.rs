//! Engine interface for the localization service.
//!
//! Keep the public surface small and predictable.
//! Implementation details are split into submodules under `src/client/`.

pub mod blocking;
pub mod builder;
pub mod config;
pub mod core;
mod quick;
mod validation;
mod wire;

pub use blocking::BlockingEngine;
pub use builder::EngineBuilder;
pub use config::{EngineConfig, DEFAULT_API_URL};
pub use core::Engine;
pub use quick::Content;
