//! # lingo-engine
//!
//! 面向 Lingo.dev 本地化服务的异步 Rust 客户端：分块、重试、并发调度与结果重组。
//!
//! Async client for the Lingo.dev localization engine. Large payloads are split
//! into bounded chunks, sent with retry and bounded parallelism, and merged back
//! into the caller's original shape.
//!
//! ## Core Philosophy
//!
//! - **Validate first**: configuration and parameters are checked before any request
//! - **Fail loudly**: failures propagate with structured context, never swallowed
//! - **Bounded work**: chunk size, parallelism and retry time are all capped
//! - **Order preserving**: results always follow input order
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lingo_engine::{Engine, LocalizationParams};
//!
//! #[tokio::main]
//! async fn main() -> lingo_engine::Result<()> {
//!     let engine = Engine::builder("your-api-key").build()?;
//!
//!     let params = LocalizationParams::new("es").with_source_locale("en");
//!     let text = engine.localize_text("Hello, world!", &params).await?;
//!     println!("{}", text);
//!
//!     engine.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Engine, builder, configuration and blocking facade |
//! | [`batch`] | Chunk planning, scheduling and reassembly |
//! | [`resilience`] | Failure classification and retry with backoff |
//! | [`transport`] | Transport trait and the HTTP implementation |
//! | [`types`] | Payloads, parameters and progress callbacks |

pub mod batch;
pub mod client;
pub mod resilience;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{BlockingEngine, Content, Engine, EngineBuilder, EngineConfig};
pub use transport::{HttpTransport, Transport, TransportResponse};
pub use types::{
    BatchLocalizationParams, ChatMessage, Identity, LocalizationParams, Payload, ProgressCallback,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, NetworkErrorKind};
