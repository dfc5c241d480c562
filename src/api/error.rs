//! Unified API error handling
//!
//! This module provides a consistent error response format across all API endpoints.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::model::{AiError, AiErrorKind};
use crate::service::errors::{friendly_message, is_llm_error};

/// Standard error response format
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Whether repeating the request may succeed
    pub retryable: bool,
    /// Unique request ID for tracing
    pub request_id: String,
}

/// Unified API error type
///
/// All API endpoints should return `Result<T, ApiError>` for consistent error handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Bad request / validation error (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Failure reported by the AI layer, status depends on its kind
    #[error("{}", .0.message)]
    Ai(AiError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Ai(e) => e.kind.as_str(),
            ApiError::Internal(_) => "internal_error",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            ApiError::BadRequest(_) => false,
            ApiError::Ai(e) => e.retryable,
            ApiError::Internal(_) => true,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Ai(e) => match e.kind {
                AiErrorKind::Validation => StatusCode::BAD_REQUEST,
                AiErrorKind::Auth => StatusCode::UNAUTHORIZED,
                AiErrorKind::Quota => StatusCode::TOO_MANY_REQUESTS,
                AiErrorKind::Network | AiErrorKind::Generic => StatusCode::BAD_GATEWAY,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_type = self.error_type();
        let message = match self {
            ApiError::Internal(_) => friendly_message(&self.to_string()),
            _ => self.to_string(),
        };

        if status.is_server_error() && !is_llm_error(&message) {
            tracing::error!(error_type = error_type, status = status.as_u16(), message = %message, "API error");
        } else {
            tracing::warn!(error_type = error_type, status = status.as_u16(), message = %message, "API error");
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: error_type.to_string(),
            message,
            retryable: self.retryable(),
            request_id: Uuid::new_v4().to_string(),
        })
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        ApiError::Ai(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_per_ai_error_kind() {
        let cases = [
            (AiErrorKind::Validation, StatusCode::BAD_REQUEST),
            (AiErrorKind::Auth, StatusCode::UNAUTHORIZED),
            (AiErrorKind::Quota, StatusCode::TOO_MANY_REQUESTS),
            (AiErrorKind::Network, StatusCode::BAD_GATEWAY),
            (AiErrorKind::Generic, StatusCode::BAD_GATEWAY),
        ];
        for (kind, status) in cases {
            let err = ApiError::from(AiError::new(kind, "x", true));
            assert_eq!(err.status_code(), status);
        }
    }

    #[test]
    fn test_ai_error_message_passes_through() {
        let err = ApiError::from(AiError::auth("Invalid API key."));
        assert_eq!(err.to_string(), "Invalid API key.");
        assert_eq!(err.error_type(), "auth");
        assert!(!err.retryable());
    }
}
