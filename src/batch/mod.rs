//! 分块批处理模块：分块规划、并发调度与结果重组。
//!
//! # Chunked Batch Module
//!
//! Large payloads are translated as a series of bounded requests. This module
//! holds the three stages around the network call:
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ChunkPlanner`] | Splits a payload by item count and word count |
//! | [`BatchExecutor`] | Sends chunks sequentially or with bounded parallelism |
//! | [`assemble`] | Merges chunk results back into the original shape |
//!
//! ## Example
//!
//! ```rust
//! use lingo_engine::batch::{assemble, plan};
//! use lingo_engine::types::Payload;
//!
//! let mut payload = Payload::new();
//! payload.insert("a".into(), "Hello".into());
//! payload.insert("b".into(), "World".into());
//!
//! let chunks = plan(&payload, 1, 250);
//! assert_eq!(chunks.len(), 2);
//!
//! // Identity "translation" reassembles the original payload.
//! let out = assemble(&payload, chunks.into_iter().map(|c| c.items));
//! assert_eq!(out, payload);
//! ```
//!
//! ## Modes
//!
//! - **Sequential**: one chunk at a time, in order, with progress callbacks
//! - **Concurrent**: up to N chunks in flight; progress callbacks are rejected

mod assembler;
mod executor;
mod planner;

pub use assembler::{assemble, assemble_chat, assemble_text, chat_payload, text_payload};
pub use executor::{BatchExecutor, ExecutionMode};
pub(crate) use executor::run_bounded;
pub use planner::{
    plan, Chunk, ChunkConfig, ChunkPlanner, MAX_ITEMS_PER_CHUNK_LIMIT, TARGET_CHUNK_SIZE_LIMIT,
};
