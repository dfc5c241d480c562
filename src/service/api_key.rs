//! API key format checks and liveness verification

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::service::llm::ChatBackend;

const MIN_KEY_LENGTH: usize = 10;
const KEY_PREFIXES: &[&str] = &["AIza", "sk-"];

const MSG_EMPTY_KEY: &str = "Please enter your Gemini API key";
const MSG_BAD_FORMAT: &str = "Invalid API key format. Gemini API keys typically start with AIza";

/// Outcome of an API key check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyCheck {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl KeyCheck {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
        }
    }
}

/// Gemini keys start with `AIza`, OpenAI-style keys with `sk-`
pub fn validate_api_key_format(api_key: &str) -> bool {
    let key = api_key.trim();
    key.len() > MIN_KEY_LENGTH && KEY_PREFIXES.iter().any(|p| key.starts_with(p))
}

/// Offline check: presence and format only
pub fn check_api_key(api_key: &str) -> KeyCheck {
    if api_key.trim().is_empty() {
        return KeyCheck::invalid(MSG_EMPTY_KEY);
    }
    if !validate_api_key_format(api_key) {
        return KeyCheck::invalid(MSG_BAD_FORMAT);
    }
    KeyCheck::valid()
}

/// Check the key format, then ask the provider whether it accepts the key
pub async fn verify_api_key(backend: &dyn ChatBackend, api_key: &str) -> KeyCheck {
    let offline = check_api_key(api_key);
    if !offline.is_valid {
        return offline;
    }

    match backend.probe_key(api_key).await {
        Ok(status) => {
            tracing::debug!(status = status.as_u16(), "API key probe completed");
            key_check_for_status(status)
        }
        Err(e) => {
            tracing::warn!(error = %e, "API key verification failed");
            KeyCheck::invalid("Network error. Please check your internet connection and try again.")
        }
    }
}

fn key_check_for_status(status: StatusCode) -> KeyCheck {
    if status.is_success() {
        return KeyCheck::valid();
    }

    match status {
        StatusCode::UNAUTHORIZED => {
            KeyCheck::invalid("Invalid API key. Please check your Gemini API key and try again.")
        }
        StatusCode::TOO_MANY_REQUESTS => {
            KeyCheck::invalid("Rate limit exceeded. Please try again in a few minutes.")
        }
        StatusCode::FORBIDDEN => {
            KeyCheck::invalid("Access denied. Please check your API key permissions.")
        }
        _ => KeyCheck::invalid("Failed to verify API key. Please try again."),
    }
}
