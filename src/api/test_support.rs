//! Shared fixtures for handler tests

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::model::AiConfig;
use crate::service::NewsService;
use crate::service::llm::{ChatBackend, ChatRequest, LlmError};

/// Backend that answers every completion with the same reply
pub struct FixedBackend {
    pub reply: Result<String, (StatusCode, String)>,
    pub probe_status: StatusCode,
}

#[async_trait]
impl ChatBackend for FixedBackend {
    async fn complete(&self, _: &str, _: &ChatRequest) -> Result<String, LlmError> {
        self.reply.clone().map_err(|(status, message)| LlmError::Api { status, message })
    }

    async fn probe_key(&self, _: &str) -> Result<StatusCode, LlmError> {
        Ok(self.probe_status)
    }
}

pub fn news_service(reply: Result<&str, (StatusCode, &str)>, server_key: Option<&str>) -> NewsService {
    let backend = FixedBackend {
        reply: reply
            .map(str::to_string)
            .map_err(|(status, message)| (status, message.to_string())),
        probe_status: StatusCode::OK,
    };
    let config = AiConfig {
        max_retries: 0,
        retry_delay_ms: 0,
        ..AiConfig::default()
    };
    NewsService::new(Arc::new(backend), None, config, server_key.map(str::to_string))
}
