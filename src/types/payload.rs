//! Payload and chat content types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered mapping of item id to translatable content.
///
/// Backed by `serde_json::Map` with `preserve_order`, so iteration order is insertion order.
pub type Payload = serde_json::Map<String, Value>;

/// One line of a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Speaker name. Never sent for translation.
    pub name: String,
    pub text: String,
}

impl ChatMessage {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Account information returned by the identity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub id: String,
}

/// Size proxy used for chunking: whitespace-separated words of every string
/// nested in `value`. Non-string scalars count zero.
pub fn word_count(value: &Value) -> usize {
    match value {
        Value::String(s) => s.split_whitespace().count(),
        Value::Array(items) => items.iter().map(word_count).sum(),
        Value::Object(map) => map.values().map(word_count).sum(),
        _ => 0,
    }
}
