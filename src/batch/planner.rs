//! Chunk planner.

use crate::types::{word_count, Payload};
use serde_json::Value;
use tracing::debug;

pub const MAX_ITEMS_PER_CHUNK_LIMIT: usize = 250;
pub const TARGET_CHUNK_SIZE_LIMIT: usize = 2500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Maximum number of items in one chunk, `1..=250`.
    pub max_items_per_chunk: usize,
    /// Target aggregate word count of one chunk, `1..=2500`.
    pub target_chunk_size: usize,
}
impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_items_per_chunk: 25,
            target_chunk_size: 250,
        }
    }
}
impl ChunkConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_max_items_per_chunk(mut self, n: usize) -> Self {
        self.max_items_per_chunk = n;
        self
    }
    pub fn with_target_chunk_size(mut self, n: usize) -> Self {
        self.target_chunk_size = n;
        self
    }
    fn clamped(self) -> Self {
        Self {
            max_items_per_chunk: self.max_items_per_chunk.clamp(1, MAX_ITEMS_PER_CHUNK_LIMIT),
            target_chunk_size: self.target_chunk_size.clamp(1, TARGET_CHUNK_SIZE_LIMIT),
        }
    }
}

/// A contiguous slice of a payload, sent as one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub index: usize,
    pub items: Payload,
    /// Sum of the items' word counts.
    pub size: usize,
}
impl Chunk {
    fn new(index: usize) -> Self {
        Self {
            index,
            items: Payload::new(),
            size: 0,
        }
    }
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
    fn push(&mut self, key: String, value: Value, size: usize) {
        self.items.insert(key, value);
        self.size += size;
    }
}

/// Splits payloads into chunks bounded by item count and aggregate size.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkPlanner {
    config: ChunkConfig,
}

impl ChunkPlanner {
    /// Out-of-range bounds are clamped into `1..=250` / `1..=2500`.
    pub fn new(config: ChunkConfig) -> Self {
        Self {
            config: config.clamped(),
        }
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Plan chunks for `payload`, preserving item order.
    ///
    /// An item is never split. An item that alone exceeds the target size gets a
    /// chunk of its own.
    pub fn plan(&self, payload: &Payload) -> Vec<Chunk> {
        let max_items = self.config.max_items_per_chunk;
        let target = self.config.target_chunk_size;

        let mut chunks = Vec::new();
        let mut current = Chunk::new(0);

        for (key, value) in payload {
            let size = word_count(value);
            let full = current.item_count() + 1 > max_items;
            let oversize = current.size + size > target;
            if !current.is_empty() && (full || oversize) {
                let next = Chunk::new(current.index + 1);
                chunks.push(std::mem::replace(&mut current, next));
            }
            current.push(key.clone(), value.clone(), size);
        }
        if !current.is_empty() {
            chunks.push(current);
        }

        debug!(
            items = payload.len(),
            chunks = chunks.len(),
            max_items,
            target_size = target,
            "planned payload chunks"
        );
        chunks
    }
}

/// Plan with explicit bounds.
pub fn plan(payload: &Payload, max_items_per_chunk: usize, target_chunk_size: usize) -> Vec<Chunk> {
    ChunkPlanner::new(
        ChunkConfig::new()
            .with_max_items_per_chunk(max_items_per_chunk)
            .with_target_chunk_size(target_chunk_size),
    )
    .plan(payload)
}
