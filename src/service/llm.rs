//! OpenAI-compatible chat-completions client
//!
//! Talks to any endpoint exposing `/chat/completions` and `/models` with bearer
//! authentication (Gemini's compatibility layer by default). The API key is
//! supplied per call since keys belong to the requesting user.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::model::AiConfig;

/// Longest slice of a non-JSON error body kept in the error message
const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Upstream answered with a non-success status
    #[error("{status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("No response content received from the AI API")]
    EmptyResponse,

    #[error("Failed to decode AI API response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        // Keep the words classification keys on ("timeout", "connect", "network")
        let prefix = if e.is_timeout() {
            "Request timeout"
        } else if e.is_connect() {
            "Failed to connect"
        } else {
            "Network error"
        };
        LlmError::Transport(format!("{}: {}", prefix, e))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// Body of a chat-completions request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(model: &str, system_prompt: &str, user_prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt.to_string(),
                },
            ],
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = Some(temperature);
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Chat backend used by the news service
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Run a completion and return the first choice's text content
    async fn complete(&self, api_key: &str, request: &ChatRequest) -> Result<String, LlmError>;

    /// Probe the models listing with the given key and report the HTTP status
    async fn probe_key(&self, api_key: &str) -> Result<StatusCode, LlmError>;
}

/// HTTP client for an OpenAI-compatible endpoint
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: Url,
}

impl LlmClient {
    pub fn new(config: &AiConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: with_trailing_slash(config.base_url.clone()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, LlmError> {
        self.base_url
            .join(path)
            .map_err(|e| LlmError::Transport(format!("Invalid AI API URL: {}", e)))
    }
}

#[async_trait]
impl ChatBackend for LlmClient {
    async fn complete(&self, api_key: &str, request: &ChatRequest) -> Result<String, LlmError> {
        let url = self.endpoint("chat/completions")?;
        let start_time = std::time::Instant::now();

        tracing::debug!(model = %request.model, url = %url, "Sending chat completion request");

        let response = self
            .client
            .post(url)
            .bearer_auth(api_key.trim())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status,
                message: extract_error_message(&body),
            });
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        tracing::debug!(
            model = %request.model,
            elapsed_ms = start_time.elapsed().as_millis(),
            content_length = content.len(),
            "Chat completion received"
        );

        Ok(content)
    }

    async fn probe_key(&self, api_key: &str) -> Result<StatusCode, LlmError> {
        let url = self.endpoint("models")?;

        let response = self
            .client
            .get(url)
            .bearer_auth(api_key.trim())
            .send()
            .await?;

        Ok(response.status())
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Pull the vendor's message out of an error body
///
/// Handles `{"error": {"message": ..}}`, `{"error": ".."}` and the array-wrapped
/// form some Gemini endpoints return. Anything else is passed through, truncated.
fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let error = value
            .get("error")
            .or_else(|| value.get(0).and_then(|v| v.get("error")));

        if let Some(error) = error {
            if let Some(message) = error.get("message").and_then(|m| m.as_str()) {
                return message.to_string();
            }
            if let Some(message) = error.as_str() {
                return message.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "Request failed".to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> LlmClient {
        let config = AiConfig {
            base_url: Url::parse(&format!("{}/v1beta/openai", server.uri())).unwrap(),
            ..AiConfig::default()
        };
        LlmClient::new(&config).unwrap()
    }

    #[test]
    fn test_trailing_slash_added() {
        let url = with_trailing_slash(Url::parse("http://localhost/v1").unwrap());
        assert_eq!(url.join("models").unwrap().as_str(), "http://localhost/v1/models");
    }

    #[test]
    fn test_extract_error_message_variants() {
        assert_eq!(
            extract_error_message(r#"{"error": {"message": "API key not valid", "code": 400}}"#),
            "API key not valid"
        );
        assert_eq!(
            extract_error_message(r#"[{"error": {"message": "Quota exceeded"}}]"#),
            "Quota exceeded"
        );
        assert_eq!(extract_error_message(r#"{"error": "Request failed"}"#), "Request failed");
        assert_eq!(extract_error_message("  "), "Request failed");
        assert_eq!(extract_error_message("<html>bad gateway</html>"), "<html>bad gateway</html>");
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/openai/chat/completions"))
            .and(header("authorization", "Bearer AIzaTestKey123"))
            .and(body_partial_json(json!({"model": "gemini-2.0-flash"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "hello"}}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let request = ChatRequest::new("gemini-2.0-flash", "system", "user");
        let content = client.complete(" AIzaTestKey123 ", &request).await.unwrap();
        assert_eq!(content, "hello");
    }

    #[tokio::test]
    async fn test_complete_maps_status_and_vendor_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/openai/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "Resource has been exhausted (e.g. check quota)."}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let request = ChatRequest::new("m", "s", "u");
        let err = client.complete("AIzaTestKey123", &request).await.unwrap_err();

        match &err {
            LlmError::Api { status, message } => {
                assert_eq!(*status, StatusCode::TOO_MANY_REQUESTS);
                assert!(message.contains("exhausted"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("429"));
    }

    #[tokio::test]
    async fn test_complete_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/openai/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": null}}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let request = ChatRequest::new("m", "s", "u");
        let err = client.complete("AIzaTestKey123", &request).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_probe_key_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/openai/models"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let status = client.probe_key("AIzaTestKey123").await.unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
