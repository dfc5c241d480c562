use serde::Deserialize;
use std::fs;
use std::path::Path;
use url::Url;

const ENV_CONFIG_PATH: &str = "NEWSCHECK_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_API_KEY: &str = "NEWSCHECK_API_KEY";
const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
const ENV_AI_BASE_URL: &str = "NEWSCHECK_AI_BASE_URL";
const ENV_MODEL: &str = "NEWSCHECK_MODEL";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";
const DEFAULT_PRIMARY_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_FALLBACK_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_REASONING_MODEL: &str = "gemini-2.5-flash";

/// Model names used for chat completions
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub primary: String,
    /// Used for the last retry attempt
    pub fallback: String,
    pub reasoning: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY_MODEL.to_string(),
            fallback: DEFAULT_FALLBACK_MODEL.to_string(),
            reasoning: DEFAULT_REASONING_MODEL.to_string(),
        }
    }
}

/// Upstream OpenAI-compatible API settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub base_url: Url,
    pub models: ModelConfig,
    pub timeout_secs: u64,
    /// Retries after the first attempt for retryable failures
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            models: ModelConfig::default(),
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub ai: AiConfig,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub ai: AiConfig,
    /// Key used when a request does not carry its own
    pub server_api_key: Option<String>,
    pub port: u16,
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ai: AiConfig::default(),
            server_api_key: None,
            port: 8080,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let config_path = std::env::var(ENV_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut ai = Self::load_config_file(&config_path)
            .map(|cf| cf.ai)
            .unwrap_or_default();

        if let Ok(raw) = std::env::var(ENV_AI_BASE_URL) {
            match Url::parse(&raw) {
                Ok(url) => ai.base_url = url,
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "Ignoring invalid {}", ENV_AI_BASE_URL)
                }
            }
        }

        if let Ok(model) = std::env::var(ENV_MODEL) {
            ai.models.primary = model;
        }

        let server_api_key = std::env::var(ENV_API_KEY)
            .or_else(|_| std::env::var(ENV_OPENAI_API_KEY))
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Self {
            ai,
            server_api_key,
            port,
            host,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => Self::parse_config(&contents, path),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    fn parse_config(contents: &str, path: &Path) -> Option<ConfigFile> {
        let contents = contents.trim();
        if contents.is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Some(ConfigFile::default());
        }

        match serde_yaml::from_str(contents) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded configuration from file");
                Some(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
ai:
  base_url: "http://localhost:9000/v1/"
  models:
    primary: "gpt-4o"
  max_retries: 1
"#;
        let cf = Config::parse_config(yaml, Path::new("test.yaml")).unwrap();
        assert_eq!(cf.ai.base_url.as_str(), "http://localhost:9000/v1/");
        assert_eq!(cf.ai.models.primary, "gpt-4o");
        assert_eq!(cf.ai.models.fallback, DEFAULT_FALLBACK_MODEL);
        assert_eq!(cf.ai.max_retries, 1);
        assert_eq!(cf.ai.timeout_secs, 30);
    }

    #[test]
    fn test_empty_config_is_default() {
        let cf = Config::parse_config("  \n", Path::new("empty.yaml")).unwrap();
        assert_eq!(cf.ai.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(cf.ai.retry_delay_ms, 1000);
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        assert!(Config::parse_config("ai: [unclosed", Path::new("bad.yaml")).is_none());
    }

    #[test]
    fn test_bind_addr() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }
}
