use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Credibility verdict attached to a headline or generated article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Fake,
    Questionable,
    Verified,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Fake => "fake",
            Verdict::Questionable => "questionable",
            Verdict::Verified => "verified",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fake" => Ok(Verdict::Fake),
            "questionable" => Ok(Verdict::Questionable),
            "verified" => Ok(Verdict::Verified),
            other => Err(format!("unknown verdict '{}'", other)),
        }
    }
}

// Models are inconsistent about casing ("Verified", "FAKE"), so accept any.
impl<'de> Deserialize<'de> for Verdict {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct SourceLink {
    pub name: String,
    pub url: String,
}

/// One generated article returned by a headline verification
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct VerificationResult {
    #[serde(default, deserialize_with = "deserialize_id")]
    #[schemars(with = "u32")]
    pub id: String,
    pub title: String,
    pub source: String,
    pub status: Verdict,
    /// Score between 0 and 100 reported by the model
    #[serde(deserialize_with = "deserialize_confidence")]
    #[schemars(with = "u8", description = "Confidence score between 0 and 100")]
    pub confidence: u8,
    pub summary: String,
    #[serde(default)]
    pub sources: Vec<SourceLink>,
}

/// Single-verdict credibility analysis of one headline or URL
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct HeadlineAnalysis {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub source: String,
    pub status: Verdict,
    #[serde(deserialize_with = "deserialize_confidence")]
    #[schemars(with = "u8", description = "Confidence score between 0 and 100")]
    pub confidence: u8,
    pub summary: String,
    #[serde(default)]
    pub sources: Vec<SourceLink>,
}

/// Supporting, debunking or neutral article related to a headline
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct RelatedArticle {
    #[serde(default, deserialize_with = "deserialize_id")]
    #[schemars(with = "u32")]
    pub id: String,
    pub title: String,
    pub source: String,
    pub date: String,
    pub category: String,
    pub status: Verdict,
    #[schemars(description = "Brief description of the article")]
    pub excerpt: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct Votes {
    pub up: u32,
    pub down: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct TrendingArticle {
    #[serde(default, deserialize_with = "deserialize_id")]
    #[schemars(with = "u32")]
    pub id: String,
    pub title: String,
    pub source: String,
    #[schemars(description = "Relative date such as '2 hours ago'")]
    pub date: String,
    pub status: Verdict,
    #[serde(default)]
    pub votes: Votes,
    #[schemars(description = "Why the article is fake, questionable or verified")]
    pub excerpt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct ArchivedArticle {
    #[serde(default, deserialize_with = "deserialize_id")]
    #[schemars(with = "u32")]
    pub id: String,
    pub title: String,
    #[schemars(description = "Topic such as Technology, Health, Finance, Politics")]
    pub category: String,
    #[schemars(description = "Date in 'Month Day, Year' format")]
    pub date: String,
    pub status: Verdict,
    #[schemars(description = "Why the article is fake, questionable or verified")]
    pub summary: String,
}

/// Accepts numeric or string ids and normalizes them to a string
fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// Accepts integer, float or numeric-string confidence and clamps it to 0..=100
fn deserialize_confidence<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("confidence out of range"))?,
        serde_json::Value::String(s) => s
            .trim()
            .trim_end_matches('%')
            .parse::<f64>()
            .map_err(serde::de::Error::custom)?,
        other => {
            return Err(serde::de::Error::custom(format!(
                "expected numeric confidence, got {}",
                other
            )));
        }
    };

    Ok(clamp_confidence(value))
}

pub(crate) fn clamp_confidence(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
