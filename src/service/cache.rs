//! Redis cache for generated feeds and verification results

use std::env;

use redis::{AsyncCommands, Client};
use serde::{Serialize, de::DeserializeOwned};

// Environment variable names
const ENV_REDIS_HOST: &str = "NEWSCHECK_REDIS_HOST";
const ENV_REDIS_PORT: &str = "NEWSCHECK_REDIS_PORT";
const ENV_REDIS_PASSWORD: &str = "NEWSCHECK_REDIS_PASSWORD";
const ENV_REDIS_DB: &str = "NEWSCHECK_REDIS_DB";
const ENV_CACHE_TTL: &str = "NEWSCHECK_CACHE_TTL";

// Default values
const DEFAULT_REDIS_HOST: &str = "127.0.0.1";
const DEFAULT_REDIS_PORT: &str = "6379";
const DEFAULT_REDIS_DB: &str = "0";
const DEFAULT_TTL_SECONDS: u64 = 3600; // 1 hour

// Verdicts for the same headline should not outlive the news cycle
const VERIFICATION_TTL_SECONDS: u64 = 600;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Cache miss for key: {0}")]
    Miss(String),
}

// Cache key prefixes
const PREFIX_TRENDING: &str = "trending:";
const PREFIX_ARCHIVE: &str = "archive:";
const PREFIX_VERIFICATION: &str = "verify:";
const PREFIX_ANALYSIS: &str = "analysis:";

/// Redis-based cache for LLM-generated content
#[derive(Clone)]
pub struct FeedCache {
    client: Client,
    ttl_seconds: u64,
}

impl FeedCache {
    /// Create a new cache instance and verify connection
    ///
    /// Configuration via environment variables:
    /// - `NEWSCHECK_REDIS_HOST` - Redis host (default: 127.0.0.1)
    /// - `NEWSCHECK_REDIS_PORT` - Redis port (default: 6379)
    /// - `NEWSCHECK_REDIS_PASSWORD` - Redis password (default: none)
    /// - `NEWSCHECK_REDIS_DB` - Redis database number (default: 0)
    /// - `NEWSCHECK_CACHE_TTL` - Feed TTL in seconds (default: 3600)
    pub async fn new() -> Result<Self, CacheError> {
        let host = env::var(ENV_REDIS_HOST).unwrap_or_else(|_| DEFAULT_REDIS_HOST.to_string());
        let port = env::var(ENV_REDIS_PORT).unwrap_or_else(|_| DEFAULT_REDIS_PORT.to_string());
        let password = env::var(ENV_REDIS_PASSWORD).ok();
        let db = env::var(ENV_REDIS_DB).unwrap_or_else(|_| DEFAULT_REDIS_DB.to_string());

        let ttl_seconds = env::var(ENV_CACHE_TTL)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TTL_SECONDS);

        let redis_url = redis_url(&host, &port, password.as_deref(), &db);

        tracing::debug!(host = %host, port = %port, db = %db, "Connecting to Redis");

        let client = Client::open(redis_url)?;

        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        tracing::info!(host = %host, port = %port, "Redis connection established");

        Ok(Self {
            client,
            ttl_seconds,
        })
    }

    pub async fn get_trending<T: DeserializeOwned>(&self, key: &str) -> Result<T, CacheError> {
        self.get_with_prefix(PREFIX_TRENDING, key).await
    }

    pub async fn set_trending<T: Serialize>(&self, key: &str, data: &T) -> Result<(), CacheError> {
        self.set_with_prefix(PREFIX_TRENDING, key, data, self.ttl_seconds)
            .await
    }

    pub async fn get_archive<T: DeserializeOwned>(&self, key: &str) -> Result<T, CacheError> {
        self.get_with_prefix(PREFIX_ARCHIVE, key).await
    }

    pub async fn set_archive<T: Serialize>(&self, key: &str, data: &T) -> Result<(), CacheError> {
        self.set_with_prefix(PREFIX_ARCHIVE, key, data, self.ttl_seconds)
            .await
    }

    pub async fn get_verification<T: DeserializeOwned>(&self, key: &str) -> Result<T, CacheError> {
        self.get_with_prefix(PREFIX_VERIFICATION, key).await
    }

    pub async fn set_verification<T: Serialize>(
        &self,
        key: &str,
        data: &T,
    ) -> Result<(), CacheError> {
        self.set_with_prefix(PREFIX_VERIFICATION, key, data, VERIFICATION_TTL_SECONDS)
            .await
    }

    pub async fn get_analysis<T: DeserializeOwned>(&self, key: &str) -> Result<T, CacheError> {
        self.get_with_prefix(PREFIX_ANALYSIS, key).await
    }

    pub async fn set_analysis<T: Serialize>(&self, key: &str, data: &T) -> Result<(), CacheError> {
        self.set_with_prefix(PREFIX_ANALYSIS, key, data, VERIFICATION_TTL_SECONDS)
            .await
    }

    /// Round-trip a PING, used by the readiness probe
    pub async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn get_with_prefix<T: DeserializeOwned>(
        &self,
        prefix: &str,
        key: &str,
    ) -> Result<T, CacheError> {
        let full_key = format!("{}{}", prefix, key);
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let data: Option<String> = conn.get(&full_key).await?;

        match data {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| CacheError::Serialization(e.to_string()))
            }
            None => Err(CacheError::Miss(key.to_string())),
        }
    }

    async fn set_with_prefix<T: Serialize>(
        &self,
        prefix: &str,
        key: &str,
        data: &T,
        ttl: u64,
    ) -> Result<(), CacheError> {
        let full_key = format!("{}{}", prefix, key);
        let json =
            serde_json::to_string(data).map_err(|e| CacheError::Serialization(e.to_string()))?;

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(&full_key, json, ttl).await?;

        tracing::debug!(key = %full_key, ttl = ttl, "Cached data");
        Ok(())
    }
}

#[cfg(test)]
impl FeedCache {
    /// Client pointed at a closed port; every command fails with a connection error
    pub(crate) fn unreachable() -> Self {
        Self {
            client: Client::open("redis://127.0.0.1:1/0").unwrap(),
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

/// Build Redis URL: redis://[:password@]host:port/db
fn redis_url(host: &str, port: &str, password: Option<&str>, db: &str) -> String {
    match password {
        Some(pwd) if !pwd.is_empty() => format!("redis://:{}@{}:{}/{}", pwd, host, port, db),
        _ => format!("redis://{}:{}/{}", host, port, db),
    }
}
