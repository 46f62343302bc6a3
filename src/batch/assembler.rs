//! Result assembler: turns per-chunk results back into the caller's shape.

use crate::types::{ChatMessage, Payload};
use serde_json::Value;
use tracing::debug;

const TEXT_KEY: &str = "text";
const CHAT_KEY_PREFIX: &str = "chat_";

/// Merge chunk results into a payload with exactly the key set and order of `original`.
///
/// Keys the service dropped keep their source value; keys it invented are discarded.
pub fn assemble<I>(original: &Payload, chunk_results: I) -> Payload
where
    I: IntoIterator<Item = Payload>,
{
    let mut merged = Payload::new();
    for result in chunk_results {
        merged.extend(result);
    }

    let mut out = Payload::new();
    let mut missing = 0usize;
    for (key, source) in original {
        match merged.remove(key) {
            Some(translated) => {
                out.insert(key.clone(), translated);
            }
            None => {
                missing += 1;
                out.insert(key.clone(), source.clone());
            }
        }
    }
    if missing > 0 || !merged.is_empty() {
        debug!(
            missing,
            unexpected = merged.len(),
            "service response did not match the request key set"
        );
    }
    out
}

/// Payload for a single string.
pub fn text_payload(text: &str) -> Payload {
    let mut p = Payload::new();
    p.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
    p
}

/// Extract the translated string from an assembled [`text_payload`].
pub fn assemble_text(assembled: &Payload) -> String {
    match assembled.get(TEXT_KEY) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Payload for a chat transcript. Only the texts are included; speaker names stay local.
pub fn chat_payload(messages: &[ChatMessage]) -> Payload {
    messages
        .iter()
        .enumerate()
        .map(|(i, m)| (chat_key(i), Value::String(m.text.clone())))
        .collect()
}

/// Re-attach speaker names to translated texts by position.
pub fn assemble_chat(original: &[ChatMessage], assembled: &Payload) -> Vec<ChatMessage> {
    original
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let text = match assembled.get(&chat_key(i)) {
                Some(Value::String(s)) => s.clone(),
                _ => m.text.clone(),
            };
            ChatMessage {
                name: m.name.clone(),
                text,
            }
        })
        .collect()
}

fn chat_key(i: usize) -> String {
    format!("{}{}", CHAT_KEY_PREFIX, i)
}
