//! Unwrapping structured data from chat-completion text
//!
//! Models are asked for a ```json fenced block but routinely add prose around
//! it, drop the language tag, or skip the fence entirely.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::model::AiError;

static JSON_FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:[A-Za-z]+\b)?\s*(.*?)\s*```").ok());

/// Locate the JSON payload in a model reply
///
/// Preference order: a fenced block, then the outermost `[...]` span, then the
/// outermost `{...}` span.
pub fn extract_json_block(content: &str) -> Option<&str> {
    let fenced = JSON_FENCE
        .as_ref()
        .and_then(|fence| fence.captures(content))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|body| !body.is_empty());

    if fenced.is_some() {
        return fenced;
    }

    outermost_span(content, '[', ']').or_else(|| outermost_span(content, '{', '}'))
}

fn outermost_span(content: &str, open: char, close: char) -> Option<&str> {
    let start = content.find(open)?;
    let end = content.rfind(close)?;
    (end > start).then(|| &content[start..=end])
}

/// Parse a JSON array of articles out of a model reply
pub fn parse_articles<T: DeserializeOwned>(content: &str) -> Result<Vec<T>, AiError> {
    let block = extract_json_block(content).ok_or_else(|| {
        AiError::validation("Invalid response format: JSON array not found", true)
    })?;

    // Some models wrap the array in an object such as {"articles": [...]}
    let value: serde_json::Value = serde_json::from_str(block).map_err(|e| {
        tracing::warn!(error = %e, "AI response is not valid JSON");
        AiError::parse_failure()
    })?;

    let array = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(_, v)| v)
            .find(|v| v.is_array())
            .ok_or_else(|| {
                AiError::validation("Invalid response format: JSON array not found", true)
            })?,
        _ => {
            return Err(AiError::validation(
                "Invalid response format: JSON array not found",
                true,
            ));
        }
    };

    serde_json::from_value(array).map_err(|e| {
        tracing::warn!(error = %e, "AI response does not match the requested schema");
        AiError::parse_failure()
    })
}

/// Parse a single JSON object out of a model reply
pub fn parse_object<T: DeserializeOwned>(content: &str) -> Result<T, AiError> {
    let block = outermost_object(content).ok_or_else(AiError::parse_failure)?;

    serde_json::from_str(block).map_err(|e| {
        tracing::warn!(error = %e, "AI response does not match the requested schema");
        AiError::parse_failure()
    })
}

fn outermost_object(content: &str) -> Option<&str> {
    let fenced = JSON_FENCE
        .as_ref()
        .and_then(|fence| fence.captures(content))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());

    outermost_span(fenced.unwrap_or(content), '{', '}')
}
