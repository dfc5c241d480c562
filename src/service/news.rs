//! Headline verification and misinformation feeds
//!
//! Every operation follows the same shape: build a prompt, run it through the
//! chat backend with retries for retryable failures, unwrap the JSON reply,
//! and cache what is worth caching.
//!
//! Cached entries are keyed by model and prompt, not by API key, so any caller
//! holding a well-formed key can be served a cached result. Keys that fail the
//! format check always go upstream and get the provider's own verdict.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    AiConfig, AiError, ArchivedArticle, HeadlineAnalysis, RelatedArticle, TrendingArticle,
    Verdict, VerificationResult,
};
use crate::service::api_key::check_api_key;
use crate::service::cache::FeedCache;
use crate::service::cache_keys::{
    analysis_cache_key, archive_cache_key, trending_cache_key, verification_cache_key,
};
use crate::service::errors::{classify_error, clean_error_message, log_upstream_failure};
use crate::service::llm::{ChatBackend, ChatRequest, LlmError};
use crate::service::parse::{parse_articles, parse_object};
use crate::service::prompts::{
    ANALYSIS_SYSTEM_PROMPT, ARCHIVE_SYSTEM_PROMPT, FEED_SYSTEM_PROMPT, NEWS_SYSTEM_PROMPT,
    build_analysis_prompt, build_archive_prompt, build_related_prompt, build_trending_prompt,
    build_verification_prompt,
};

const FEED_TEMPERATURE: f32 = 1.0;
const FEED_MAX_TOKENS: u32 = 4096;

const MSG_EMPTY_QUERY: &str = "Please enter a news headline to verify.";
const MSG_MISSING_KEY: &str = "API key not found. Please set up your API key.";
const MSG_NO_RESULTS: &str = "No results found for your query";
const MSG_NO_CONTENT: &str = "No response content received from the AI API";
const MSG_MISSING_TARGET: &str = "URL or headline is required";
const UNKNOWN_SOURCE: &str = "Unknown source";

/// Generated articles together with the time they were produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed<T> {
    pub articles: Vec<T>,
    pub generated_at: DateTime<Utc>,
}

/// Input for a single-verdict analysis; at least one field must be present
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub url: Option<String>,
    pub headline: Option<String>,
}

/// Filters applied to the archive feed after generation
#[derive(Debug, Clone, Default)]
pub struct ArchiveFilter {
    /// Case-insensitive substring of the title
    pub keyword: Option<String>,
    /// Case-insensitive category name; "all" matches everything
    pub category: Option<String>,
    pub status: Option<Verdict>,
}

impl ArchiveFilter {
    pub fn matches(&self, article: &ArchivedArticle) -> bool {
        let keyword_ok = match non_blank(self.keyword.as_deref()) {
            Some(keyword) => article
                .title
                .to_lowercase()
                .contains(&keyword.to_lowercase()),
            None => true,
        };

        let category_ok = match non_blank(self.category.as_deref()) {
            Some(category) if !category.eq_ignore_ascii_case("all") => {
                article.category.trim().eq_ignore_ascii_case(category)
            }
            _ => true,
        };

        let status_ok = self.status.is_none_or(|s| article.status == s);

        keyword_ok && category_ok && status_ok
    }
}

/// Service for LLM-backed headline verification and feed generation
pub struct NewsService {
    backend: Arc<dyn ChatBackend>,
    cache: Option<FeedCache>,
    config: AiConfig,
    server_api_key: Option<String>,
}

impl NewsService {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        cache: Option<FeedCache>,
        config: AiConfig,
        server_api_key: Option<String>,
    ) -> Self {
        tracing::info!(
            model = %config.models.primary,
            fallback_model = %config.models.fallback,
            max_retries = config.max_retries,
            server_key = server_api_key.is_some(),
            "News service initialized"
        );

        Self {
            backend,
            cache,
            config,
            server_api_key,
        }
    }

    pub fn backend(&self) -> &dyn ChatBackend {
        self.backend.as_ref()
    }

    /// Key from the request, falling back to the server-side key
    pub fn resolve_api_key(&self, request_key: Option<&str>) -> Result<String, AiError> {
        non_blank(request_key)
            .or(self.server_api_key.as_deref())
            .map(|k| k.to_string())
            .ok_or_else(|| AiError::auth(MSG_MISSING_KEY))
    }

    /// Generate articles that bear on the credibility of a headline
    pub async fn verify_headline(
        &self,
        api_key: Option<&str>,
        query: &str,
    ) -> Result<Vec<VerificationResult>, AiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AiError::validation(MSG_EMPTY_QUERY, false));
        }
        let api_key = self.resolve_api_key(api_key)?;

        let cache_key = verification_cache_key(&self.config.models.primary, query);
        if let Some(cache) = self.readable_cache(&api_key) {
            if let Ok(cached) = cache.get_verification::<Vec<VerificationResult>>(&cache_key).await
            {
                tracing::debug!(query = %query, "Verification served from cache");
                return Ok(cached);
            }
        }

        let prompt = build_verification_prompt(query);
        let mut results: Vec<VerificationResult> = self
            .generate(
                "verify_headline",
                &self.config.models.primary,
                &api_key,
                NEWS_SYSTEM_PROMPT,
                &prompt,
                None,
                |c| parse_articles(c),
            )
            .await?;

        if results.is_empty() {
            return Err(AiError::generic(MSG_NO_RESULTS));
        }
        fill_missing_ids(&mut results, |r| &mut r.id);

        tracing::info!(query = %query, results = results.len(), "Headline verified");

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_verification(&cache_key, &results).await {
                tracing::warn!(error = %e, "Failed to cache verification");
            }
        }

        Ok(results)
    }

    /// Single-verdict credibility analysis of a URL or headline
    pub async fn analyze(
        &self,
        api_key: Option<&str>,
        request: AnalysisRequest,
    ) -> Result<HeadlineAnalysis, AiError> {
        let url = non_blank(request.url.as_deref()).map(str::to_string);
        let headline = non_blank(request.headline.as_deref()).map(str::to_string);

        let content = url
            .clone()
            .or_else(|| headline.clone())
            .ok_or_else(|| AiError::validation(MSG_MISSING_TARGET, false))?;
        let api_key = self.resolve_api_key(api_key)?;

        let cache_key = analysis_cache_key(&self.config.models.reasoning, &content);
        if let Some(cache) = self.readable_cache(&api_key) {
            if let Ok(cached) = cache.get_analysis::<HeadlineAnalysis>(&cache_key).await {
                return Ok(cached);
            }
        }

        let prompt = build_analysis_prompt(&content);
        let mut analysis: HeadlineAnalysis = self
            .generate(
                "analyze",
                &self.config.models.reasoning,
                &api_key,
                ANALYSIS_SYSTEM_PROMPT,
                &prompt,
                None,
                |c| parse_object(c),
            )
            .await?;

        analysis.title = headline.clone().unwrap_or_else(|| content.clone());
        analysis.source = url.unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

        tracing::info!(
            status = %analysis.status,
            confidence = analysis.confidence,
            "Content analyzed"
        );

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_analysis(&cache_key, &analysis).await {
                tracing::warn!(error = %e, "Failed to cache analysis");
            }
        }

        Ok(analysis)
    }

    /// Supporting, debunking and neutral coverage for a headline
    pub async fn related_articles(
        &self,
        api_key: Option<&str>,
        query: &str,
    ) -> Result<Vec<RelatedArticle>, AiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AiError::validation(MSG_EMPTY_QUERY, false));
        }
        let api_key = self.resolve_api_key(api_key)?;

        let prompt = build_related_prompt(query);
        let mut articles: Vec<RelatedArticle> = self
            .generate(
                "related_articles",
                &self.config.models.primary,
                &api_key,
                NEWS_SYSTEM_PROMPT,
                &prompt,
                None,
                |c| parse_articles(c),
            )
            .await?;

        fill_missing_ids(&mut articles, |a| &mut a.id);
        Ok(articles)
    }

    /// Trending misinformation feed, optionally narrowed to one verdict
    pub async fn trending(
        &self,
        api_key: Option<&str>,
        status: Option<Verdict>,
    ) -> Result<Feed<TrendingArticle>, AiError> {
        let api_key = self.resolve_api_key(api_key)?;
        let cache_key = trending_cache_key(&self.config.models.primary);

        let cached = match self.readable_cache(&api_key) {
            Some(cache) => cache.get_trending::<Feed<TrendingArticle>>(&cache_key).await.ok(),
            None => None,
        };

        let mut feed = match cached {
            Some(feed) => {
                tracing::debug!("Trending feed served from cache");
                feed
            }
            None => {
                let prompt = build_trending_prompt();
                let mut articles: Vec<TrendingArticle> = self
                    .generate(
                        "trending",
                        &self.config.models.primary,
                        &api_key,
                        FEED_SYSTEM_PROMPT,
                        &prompt,
                        Some((FEED_TEMPERATURE, FEED_MAX_TOKENS)),
                        |c| parse_articles(c),
                    )
                    .await?;
                fill_missing_ids(&mut articles, |a| &mut a.id);

                let feed = Feed {
                    articles,
                    generated_at: Utc::now(),
                };
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache.set_trending(&cache_key, &feed).await {
                        tracing::warn!(error = %e, "Failed to cache trending feed");
                    }
                }
                feed
            }
        };

        if let Some(status) = status {
            feed.articles.retain(|a| a.status == status);
        }
        Ok(feed)
    }

    /// Archive feed with keyword, category and status filters
    pub async fn archive(
        &self,
        api_key: Option<&str>,
        filter: &ArchiveFilter,
    ) -> Result<Feed<ArchivedArticle>, AiError> {
        let api_key = self.resolve_api_key(api_key)?;
        let cache_key = archive_cache_key(&self.config.models.primary);

        let cached = match self.readable_cache(&api_key) {
            Some(cache) => cache.get_archive::<Feed<ArchivedArticle>>(&cache_key).await.ok(),
            None => None,
        };

        let mut feed = match cached {
            Some(feed) => feed,
            None => {
                let prompt = build_archive_prompt();
                let mut articles: Vec<ArchivedArticle> = self
                    .generate(
                        "archive",
                        &self.config.models.primary,
                        &api_key,
                        ARCHIVE_SYSTEM_PROMPT,
                        &prompt,
                        Some((FEED_TEMPERATURE, FEED_MAX_TOKENS)),
                        |c| parse_articles(c),
                    )
                    .await?;
                fill_missing_ids(&mut articles, |a| &mut a.id);

                let feed = Feed {
                    articles,
                    generated_at: Utc::now(),
                };
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache.set_archive(&cache_key, &feed).await {
                        tracing::warn!(error = %e, "Failed to cache archive feed");
                    }
                }
                feed
            }
        };

        feed.articles.retain(|a| filter.matches(a));
        Ok(feed)
    }

    /// Cache to read from, withheld from keys that are not even well formed
    fn readable_cache(&self, api_key: &str) -> Option<&FeedCache> {
        let cache = self.cache.as_ref()?;
        if !check_api_key(api_key).is_valid {
            tracing::debug!("Skipping cache for malformed API key");
            return None;
        }
        Some(cache)
    }

    /// Run a completion and parse it, retrying retryable failures
    ///
    /// The last retry switches to the fallback model.
    #[allow(clippy::too_many_arguments)]
    async fn generate<T, F>(
        &self,
        operation: &str,
        primary_model: &str,
        api_key: &str,
        system_prompt: &str,
        user_prompt: &str,
        sampling: Option<(f32, u32)>,
        parse: F,
    ) -> Result<T, AiError>
    where
        F: Fn(&str) -> Result<T, AiError>,
    {
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            let model = if attempt > 0 && attempt == max_retries {
                self.config.models.fallback.as_str()
            } else {
                primary_model
            };

            let mut request = ChatRequest::new(model, system_prompt, user_prompt);
            if let Some((temperature, max_tokens)) = sampling {
                request = request.with_sampling(temperature, max_tokens);
            }

            let start_time = Instant::now();
            let outcome = match self.backend.complete(api_key, &request).await {
                Ok(content) => parse(&content),
                Err(e) => Err(self.to_ai_error(operation, e)),
            };

            match outcome {
                Ok(value) => {
                    tracing::info!(
                        operation = operation,
                        model = %model,
                        attempt = attempt + 1,
                        elapsed_ms = start_time.elapsed().as_millis(),
                        prompt_length = user_prompt.len(),
                        "AI generation completed"
                    );
                    return Ok(value);
                }
                Err(err) if err.retryable && attempt < max_retries => {
                    attempt += 1;
                    tracing::debug!(
                        operation = operation,
                        attempt = attempt,
                        kind = err.kind.as_str(),
                        "Retrying AI generation"
                    );
                    tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                }
                Err(err) => {
                    tracing::debug!(
                        operation = operation,
                        kind = err.kind.as_str(),
                        retryable = err.retryable,
                        "AI generation failed"
                    );
                    return Err(err);
                }
            }
        }
    }

    fn to_ai_error(&self, operation: &str, error: LlmError) -> AiError {
        let raw = error.to_string();
        log_upstream_failure(operation, &raw);

        match error {
            LlmError::EmptyResponse => AiError::generic(MSG_NO_CONTENT),
            _ => classify_error(&clean_error_message(&raw)),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Give positional ids to articles the model returned without one
fn fill_missing_ids<T>(items: &mut [T], id: impl Fn(&mut T) -> &mut String) {
    for (index, item) in items.iter_mut().enumerate() {
        let id = id(item);
        if id.trim().is_empty() {
            *id = (index + 1).to_string();
        }
    }
}
