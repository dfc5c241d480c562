//! Application state and service initialization

use std::sync::Arc;

use crate::model::Config;
use crate::service::{FeedCache, LlmClient, NewsService};

/// Shared resources handed to the Actix-web workers
pub struct AppState {
    /// Redis cache (optional)
    pub cache: Option<FeedCache>,
    /// Headline verification and feed generation
    pub news_service: NewsService,
}

impl AppState {
    /// Connect the optional cache and build the LLM-backed news service
    ///
    /// A server API key is not required: callers may supply their own with
    /// each request.
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let cache = match FeedCache::new().await {
            Ok(cache) => {
                tracing::info!("Redis cache enabled");
                Some(cache)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis cache unavailable, running without cache");
                None
            }
        };

        let llm_client = LlmClient::new(&config.ai)
            .map_err(|e| AppError::InvalidConfig(format!("AI client: {e}")))?;

        if config.server_api_key.is_none() {
            tracing::info!("No server API key configured, requests must carry their own");
        }

        tracing::info!(base_url = %llm_client.base_url(), "AI provider configured");

        let news_service = NewsService::new(
            Arc::new(llm_client),
            cache.clone(),
            config.ai,
            config.server_api_key,
        );

        Ok(Self {
            cache,
            news_service,
        })
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
