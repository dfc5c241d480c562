//! Utilities for generating cache keys for generated feeds and verifications

use sha2::{Digest, Sha256};

use crate::service::prompts::{
    ANALYSIS_SYSTEM_PROMPT, ARCHIVE_SYSTEM_PROMPT, FEED_SYSTEM_PROMPT, NEWS_SYSTEM_PROMPT,
    build_analysis_prompt, build_archive_prompt, build_trending_prompt, build_verification_prompt,
};

/// Cache key for the trending feed
///
/// Hashing the prompt text versions the key, so a prompt change never serves
/// stale articles generated for the old wording.
pub fn trending_cache_key(model_id: &str) -> String {
    prompt_key(model_id, FEED_SYSTEM_PROMPT, &build_trending_prompt())
}

/// Cache key for the unfiltered archive feed
pub fn archive_cache_key(model_id: &str) -> String {
    prompt_key(model_id, ARCHIVE_SYSTEM_PROMPT, &build_archive_prompt())
}

/// Cache key for a headline verification
///
/// The query is normalized (trimmed, lowercased, whitespace collapsed) so
/// trivially different spellings of the same headline share an entry.
pub fn verification_cache_key(model_id: &str, query: &str) -> String {
    let normalized = normalize_query(query);
    prompt_key(
        model_id,
        NEWS_SYSTEM_PROMPT,
        &build_verification_prompt(&normalized),
    )
}

/// Cache key for a single-verdict analysis
pub fn analysis_cache_key(model_id: &str, content: &str) -> String {
    let normalized = normalize_query(content);
    prompt_key(
        model_id,
        ANALYSIS_SYSTEM_PROMPT,
        &build_analysis_prompt(&normalized),
    )
}

fn prompt_key(model_id: &str, system_prompt: &str, user_prompt: &str) -> String {
    let key_components = format!("{}|{}|{}", model_id, system_prompt, user_prompt);
    hash_string(&key_components)
}

fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Hash a string to a hex string using SHA256
fn hash_string(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_key_normalizes_query() {
        let a = verification_cache_key("gemini-2.0-flash", "  Moon  Landing staged ");
        let b = verification_cache_key("gemini-2.0-flash", "moon landing STAGED");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_keys_differ_by_model_and_feed() {
        assert_ne!(trending_cache_key("a"), trending_cache_key("b"));
        assert_ne!(trending_cache_key("a"), archive_cache_key("a"));
        assert_ne!(
            verification_cache_key("a", "headline"),
            analysis_cache_key("a", "headline")
        );
    }
}
