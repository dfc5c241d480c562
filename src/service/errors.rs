//! Classification of raw upstream error text
//!
//! Vendor errors arrive as free text (HTTP status plus message). These helpers
//! clean that text up and map it onto [`AiErrorKind`] with a retry decision.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{AiError, AiErrorKind};

const UNEXPECTED_ERROR: &str = "An unexpected error occurred";
const SOMETHING_WENT_WRONG: &str = "Something went wrong. Please try again.";

/// Prefixes SDKs and proxies put in front of the actual message
const ERROR_PREFIXES: &[&str] = &["Error:", "APIError:", "OpenAI_API_ERROR:"];

/// Substrings that identify an expected vendor-side failure
const VENDOR_ERROR_MARKERS: &[&str] = &[
    "openai",
    "gemini",
    "quota",
    "billing",
    "api key",
    "unauthorized",
    "rate limit",
    "429",
    "401",
    "403",
];

static STACK_NOISE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"webpack-internal://.*", r"\bat\s+.*", r"\s+eval\s+.*"]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});

/// Keep only the first line of an error and drop well-known prefixes
pub fn clean_error_message(raw: &str) -> String {
    let first_line = raw.lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        return UNEXPECTED_ERROR.to_string();
    }

    let mut cleaned = first_line;
    for prefix in ERROR_PREFIXES {
        if let Some(rest) = cleaned.strip_prefix(prefix) {
            cleaned = rest.trim_start();
        }
    }

    cleaned.trim().to_string()
}

/// Map a raw error message onto the error taxonomy
///
/// Checks run in a fixed order and the first match wins, so a message that
/// mentions both "429" and "rate limit" is a non-retryable quota error.
pub fn classify_error(raw: &str) -> AiError {
    let message = raw.to_lowercase();
    let has = |needle: &str| message.contains(needle);

    if has("429") || has("quota") || has("billing") {
        return AiError::new(
            AiErrorKind::Quota,
            "API quota exceeded. Please check your plan and billing details with your AI provider.",
            false,
        );
    }

    if has("401") || has("unauthorized") {
        return AiError::new(
            AiErrorKind::Auth,
            "Invalid API key. Please check your API key is correct and active.",
            false,
        );
    }

    if has("403") || has("forbidden") {
        return AiError::new(
            AiErrorKind::Auth,
            "Access denied. Please check your API key permissions.",
            false,
        );
    }

    if has("rate limit") {
        return AiError::new(
            AiErrorKind::Quota,
            "Rate limit exceeded. Please wait a moment and try again.",
            true,
        );
    }

    if has("network") || has("timeout") || has("connect") {
        return AiError::new(
            AiErrorKind::Network,
            "Network error. Please check your internet connection and try again.",
            true,
        );
    }

    AiError::new(
        AiErrorKind::Generic,
        "An unexpected error occurred. Please try again.",
        true,
    )
}

pub fn is_quota_error(message: &str) -> bool {
    ["quota", "billing", "exceeded", "plan", "429"]
        .iter()
        .any(|needle| message.contains(needle))
}

pub fn is_api_key_error(message: &str) -> bool {
    ["401", "Unauthorized", "Invalid API key", "API key not found"]
        .iter()
        .any(|needle| message.contains(needle))
}

/// Whether the message looks like an expected upstream failure rather than a bug
pub fn is_llm_error(message: &str) -> bool {
    let message = message.to_lowercase();
    VENDOR_ERROR_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

/// Display message for an arbitrary error, free of stack-trace noise
pub fn friendly_message(raw: &str) -> String {
    if raw.contains("429") || raw.contains("quota") {
        return "API quota exceeded. Please check your billing and usage limits.".to_string();
    }
    if raw.contains("401") || raw.contains("Unauthorized") {
        return "Invalid API key. Please check your API key.".to_string();
    }
    if raw.contains("403") || raw.contains("Forbidden") {
        return "Access denied. Please check your API key permissions.".to_string();
    }
    if raw.contains("network") || raw.contains("fetch") {
        return "Network error. Please check your internet connection and try again.".to_string();
    }
    if raw.contains("billing") {
        return "Billing issue with your AI provider. Please check your account status."
            .to_string();
    }

    let mut cleaned = raw.lines().next().unwrap_or("").to_string();
    for pattern in STACK_NOISE.iter() {
        cleaned = pattern.replace(&cleaned, "").to_string();
    }
    let cleaned = cleaned.trim();

    if cleaned.len() < 10 || cleaned.contains("webpack") || cleaned.contains("eval") {
        return SOMETHING_WENT_WRONG.to_string();
    }

    cleaned.to_string()
}

/// Log an upstream failure, keeping expected vendor errors out of the error level
pub fn log_upstream_failure(operation: &str, raw: &str) {
    if is_llm_error(raw) {
        tracing::warn!(
            operation = operation,
            quota = is_quota_error(raw),
            api_key = is_api_key_error(raw),
            error = %raw,
            "AI provider rejected request"
        );
    } else {
        tracing::error!(operation = operation, error = %raw, "AI request failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_prefix_and_extra_lines() {
        assert_eq!(
            clean_error_message("Error: 429 You exceeded your quota\n    at foo (bar.js:1)"),
            "429 You exceeded your quota"
        );
        assert_eq!(
            clean_error_message("APIError: something broke"),
            "something broke"
        );
        assert_eq!(clean_error_message(""), UNEXPECTED_ERROR);
        assert_eq!(clean_error_message("\n\nsecond"), UNEXPECTED_ERROR);
    }

    #[test]
    fn test_classify_quota() {
        let err = classify_error("429 Too Many Requests");
        assert_eq!(err.kind, AiErrorKind::Quota);
        assert!(!err.retryable);

        let err = classify_error("Billing hard limit reached");
        assert_eq!(err.kind, AiErrorKind::Quota);
    }

    #[test]
    fn test_classify_auth() {
        let err = classify_error("401 Unauthorized: API key not valid");
        assert_eq!(err.kind, AiErrorKind::Auth);
        assert!(!err.retryable);
        assert!(err.message.starts_with("Invalid API key"));

        let err = classify_error("403 Forbidden");
        assert_eq!(err.kind, AiErrorKind::Auth);
        assert!(err.message.starts_with("Access denied"));
    }

    #[test]
    fn test_classify_rate_limit_is_retryable() {
        let err = classify_error("Rate limit reached for requests");
        assert_eq!(err.kind, AiErrorKind::Quota);
        assert!(err.retryable);
    }

    #[test]
    fn test_classify_order_quota_before_rate_limit() {
        let err = classify_error("429: rate limit exceeded");
        assert_eq!(err.kind, AiErrorKind::Quota);
        assert!(!err.retryable);
    }

    #[test]
    fn test_classify_network() {
        for msg in ["network unreachable", "request timeout", "failed to connect"] {
            let err = classify_error(msg);
            assert_eq!(err.kind, AiErrorKind::Network, "{msg}");
            assert!(err.retryable);
        }
    }

    #[test]
    fn test_classify_generic_fallback() {
        let err = classify_error("500 Internal Server Error");
        assert_eq!(err.kind, AiErrorKind::Generic);
        assert!(err.retryable);
    }

    #[test]
    fn test_quota_and_key_predicates() {
        assert!(is_quota_error("You exceeded your current plan"));
        assert!(!is_quota_error("bad gateway"));
        assert!(is_api_key_error("API key not found"));
        assert!(!is_api_key_error("unauthorized"));
    }

    #[test]
    fn test_is_llm_error() {
        assert!(is_llm_error("Gemini returned 403"));
        assert!(is_llm_error("Rate Limit reached"));
        assert!(!is_llm_error("failed to parse config"));
    }

    #[test]
    fn test_friendly_message_strips_stack_noise() {
        assert_eq!(
            friendly_message("Model overloaded, retry later at handler (webpack-internal:///x.js)"),
            "Model overloaded, retry later"
        );
        assert_eq!(friendly_message("oops"), SOMETHING_WENT_WRONG);
        assert_eq!(
            friendly_message("Maximum recursion depth exceeded while rendering template"),
            "Maximum recursion depth exceeded while rendering template"
        );
        assert_eq!(
            friendly_message("Upgrade your plan to continue"),
            "Upgrade your plan to continue"
        );
        assert_eq!(
            friendly_message("Request failed: fetch error"),
            "Network error. Please check your internet connection and try again."
        );
    }

    #[test]
    fn test_friendly_message_check_order() {
        assert!(friendly_message("429 billing hard limit").starts_with("API quota exceeded"));
        assert!(friendly_message("401 Unauthorized: network").starts_with("Invalid API key"));
        assert!(friendly_message("403 Forbidden while fetching").starts_with("Access denied"));
        assert!(friendly_message("billing account suspended").starts_with("Billing issue"));
    }
}
