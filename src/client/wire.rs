//! Request bodies and response decoding for the localization service.

use crate::transport::TransportResponse;
use crate::types::{Identity, LocalizationParams, Payload};
use crate::{Error, ErrorContext, Result};
use serde_json::{json, Value};

pub(crate) const LOCALIZE_PATH: &str = "/i18n";
pub(crate) const RECOGNIZE_PATH: &str = "/recognize";
pub(crate) const WHOAMI_PATH: &str = "/whoami";

pub(crate) fn localize_request(workflow_id: &str, params: &LocalizationParams, data: &Payload) -> Value {
    let mut body = json!({
        "params": {
            "workflowId": workflow_id,
            "fast": params.fast,
        },
        "locale": {
            "source": params.source_locale,
            "target": params.target_locale,
        },
        "data": data,
    });
    if let (Some(reference), Value::Object(map)) = (&params.reference, &mut body) {
        map.insert("reference".to_string(), Value::Object(reference.clone()));
    }
    body
}

/// Decode a localize response into the translated chunk.
///
/// Non-2xx becomes [`Error::Api`]; a 2xx carrying `error` instead of `data`
/// becomes [`Error::Service`].
pub(crate) fn localize_response(resp: TransportResponse) -> Result<Payload> {
    let body = resp.error_for_status()?.json()?;
    match body.get("data") {
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(Value::Null) | None => {
            let message = match body.get("error") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "response contains no data".to_string(),
            };
            Err(Error::Service {
                message,
                context: ErrorContext::new()
                    .with_details(truncate(&body.to_string(), 512))
                    .with_source("localize"),
            })
        }
        Some(other) => Err(Error::Service {
            message: format!("unexpected data type: {}", type_name(other)),
            context: ErrorContext::new().with_source("localize"),
        }),
    }
}

pub(crate) fn recognize_request(text: &str) -> Value {
    json!({ "text": text })
}

/// Detected locale code; empty when the service returns none.
pub(crate) fn recognize_response(resp: TransportResponse) -> Result<String> {
    let body = resp.error_for_status()?.json()?;
    Ok(body
        .get("locale")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string())
}

pub(crate) fn whoami_response(resp: TransportResponse) -> Result<Option<Identity>> {
    let body = resp.error_for_status()?.json()?;
    let email = match body.get("email").and_then(Value::as_str) {
        Some(e) if !e.is_empty() => e.to_string(),
        _ => return Ok(None),
    };
    let id = match body.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    Ok(Some(Identity { email, id }))
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
