use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Category of a failed AI operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AiErrorKind {
    Quota,
    Auth,
    Network,
    Validation,
    Generic,
}

impl AiErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiErrorKind::Quota => "quota",
            AiErrorKind::Auth => "auth",
            AiErrorKind::Network => "network",
            AiErrorKind::Validation => "validation",
            AiErrorKind::Generic => "generic",
        }
    }
}

/// User-facing AI failure: a cleaned message plus whether retrying can help
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, thiserror::Error)]
#[error("{kind:?} error: {message}")]
pub struct AiError {
    pub kind: AiErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl AiError {
    pub fn new(kind: AiErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    pub fn validation(message: impl Into<String>, retryable: bool) -> Self {
        Self::new(AiErrorKind::Validation, message, retryable)
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(AiErrorKind::Generic, message, true)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(AiErrorKind::Auth, message, false)
    }

    pub fn parse_failure() -> Self {
        Self::validation("Failed to parse response data", true)
    }
}
