//! Prompts for headline verification and feed generation

use std::sync::LazyLock;

use regex::Regex;
use schemars::{JsonSchema, schema_for};

use crate::model::{
    ArchivedArticle, HeadlineAnalysis, RelatedArticle, TrendingArticle, VerificationResult,
};

pub const NEWS_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that generates examples of news articles.";

pub const FEED_SYSTEM_PROMPT: &str = "You are a helpful assistant that generates examples of \
trending news articles, including fake, questionable, and verified ones, with detailed information.";

pub const ARCHIVE_SYSTEM_PROMPT: &str = "You are a helpful assistant that generates examples of \
archived news articles, including fake, questionable, and verified ones, with detailed information.";

pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are a news credibility analyst.

Assess the credibility of the content you are given and answer with a single
JSON object. Do not add commentary outside the JSON."#;

const VERIFICATION_ARTICLE_COUNT: usize = 5;
const RELATED_ARTICLE_COUNT: usize = 8;
const TRENDING_ARTICLE_COUNT: usize = 6;
const ARCHIVE_ARTICLE_COUNT: usize = 8;

static FAKE_QUERY: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?i)fake").ok());
static VERIFIED_QUERY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)real|verified|true").ok());

/// Which statuses the verification prompt should steer towards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFocus {
    FakeOrQuestionable,
    Verified,
    Mixed,
}

impl StatusFocus {
    pub fn for_query(query: &str) -> Self {
        let matches = |re: &LazyLock<Option<Regex>>| {
            re.as_ref().map(|r| r.is_match(query)).unwrap_or(false)
        };

        if matches(&FAKE_QUERY) {
            StatusFocus::FakeOrQuestionable
        } else if matches(&VERIFIED_QUERY) {
            StatusFocus::Verified
        } else {
            StatusFocus::Mixed
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            StatusFocus::FakeOrQuestionable => {
                "Focus on generating articles with statuses 'fake' or 'questionable' (with an \
                 explanation why they are flagged as fake or misleading)."
            }
            StatusFocus::Verified => {
                "Focus on generating articles with a 'verified' status (with explanations about \
                 their authenticity and multiple sources confirming the information)."
            }
            StatusFocus::Mixed => {
                "Include articles with statuses 'fake', 'questionable', and 'verified'."
            }
        }
    }
}

/// Render the JSON Schema the reply must follow
fn schema_block<T: JsonSchema>() -> String {
    let schema = schema_for!(T);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}

/// Prompt for the articles returned by a headline verification
pub fn build_verification_prompt(query: &str) -> String {
    let query = query.trim();
    let focus = StatusFocus::for_query(query);

    format!(
        r#"Please generate a list of {count} news articles related to "{query}". {instruction} Each article should have the following fields:
- id (number)
- title (string)
- source (string)
- status (string: "fake", "questionable", or "verified")
- confidence (number between 0 and 100)
- summary (string)
- sources: an array of objects, where each object has a "name" (string) and a "url" (string).

The output must conform to this JSON Schema:

{schema}

Ensure the output is a valid JSON array wrapped in a ```json code block.

Generate {count} articles related to "{query}"."#,
        count = VERIFICATION_ARTICLE_COUNT,
        instruction = focus.instruction(),
        schema = schema_block::<Vec<VerificationResult>>(),
    )
}

/// Prompt for a single-verdict analysis of a headline or URL
pub fn build_analysis_prompt(content: &str) -> String {
    format!(
        r#"Analyze the following news content for credibility:
"{content}"

Provide a detailed fact-check analysis with the following information:
1. A determination if the content is "fake", "questionable", or "verified"
2. A confidence score (0-100)
3. A summary of your analysis
4. List of sources that support your conclusion

Format your response as a JSON object conforming to this JSON Schema:

{schema}"#,
        content = content.trim(),
        schema = schema_block::<HeadlineAnalysis>(),
    )
}

/// Prompt for supporting, debunking and neutral coverage of a headline
pub fn build_related_prompt(query: &str) -> String {
    format!(
        r#"I need to verify the following news headline: "{query}".

Please provide {count} related news articles that would help with fact-checking. Include a mix of:
- 2-3 articles supporting the claim
- 2-3 articles contradicting or debunking the claim
- 2-3 neutral/analytical articles

For each article, provide:
- id (number)
- title (string)
- source (string)
- date (string)
- category (string)
- status ("verified", "questionable", or "fake")
- excerpt (string - brief description)

The output must conform to this JSON Schema:

{schema}

Format the response as a JSON array starting with ```json and ending with ```."#,
        query = query.trim(),
        count = RELATED_ARTICLE_COUNT,
        schema = schema_block::<Vec<RelatedArticle>>(),
    )
}

pub fn build_trending_prompt() -> String {
    format!(
        r#"Please generate a list of {count} trending news articles with recent dates (e.g., "2 hours ago", "5 hours ago", "1 day ago"). Include at least one fake, one questionable, and one verified article. Each article should have the following fields:
- id (number)
- title (string)
- source (string)
- date (string)
- status (string: "fake", "questionable", or "verified")
- votes (object with up and down numbers)
- excerpt (string explaining why it's fake, questionable, or verified)

The output must conform to this JSON Schema:

{schema}

Ensure the output is a valid JSON array with proper JSON formatting (keys in double quotes), wrapped in a ```json code block.

Please generate {count} articles in this exact format."#,
        count = TRENDING_ARTICLE_COUNT,
        schema = schema_block::<Vec<TrendingArticle>>(),
    )
}

pub fn build_archive_prompt() -> String {
    format!(
        r#"Please generate a list of {count} archived news articles with dates from the past few months (e.g., "March 15, 2024", "February 28, 2024"). Include at least two fake, two questionable, and two verified articles. Each article should have the following fields:
- id (number)
- title (string)
- category (string: e.g., "Technology", "Health", "Finance", "Entertainment", "Politics", "Business")
- date (string: in "Month Day, Year" format)
- status (string: "fake", "questionable", or "verified")
- summary (string explaining why it's fake, questionable, or verified)

The output must conform to this JSON Schema:

{schema}

Ensure the output is a valid JSON array with proper JSON formatting (keys should be in double quotes), wrapped in a ```json code block.

Please generate {count} articles in this exact format."#,
        count = ARCHIVE_ARTICLE_COUNT,
        schema = schema_block::<Vec<ArchivedArticle>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_focus_from_query() {
        assert_eq!(
            StatusFocus::for_query("Is this FAKE news about vaccines?"),
            StatusFocus::FakeOrQuestionable
        );
        assert_eq!(
            StatusFocus::for_query("is it true that the bridge collapsed"),
            StatusFocus::Verified
        );
        assert_eq!(
            StatusFocus::for_query("Central bank raises rates"),
            StatusFocus::Mixed
        );
        // "fake" wins over "true" when both appear
        assert_eq!(
            StatusFocus::for_query("true or fake?"),
            StatusFocus::FakeOrQuestionable
        );
    }

    #[test]
    fn test_verification_prompt_contents() {
        let prompt = build_verification_prompt("  Moon landing was staged  ");
        assert!(prompt.contains("5 news articles related to \"Moon landing was staged\""));
        assert!(prompt.contains("Include articles with statuses 'fake', 'questionable', and 'verified'"));
        assert!(prompt.contains("\"confidence\""));
        assert!(prompt.contains("```json"));
    }

    #[test]
    fn test_feed_prompts_embed_schema() {
        let trending = build_trending_prompt();
        assert!(trending.contains("6 trending news articles"));
        assert!(trending.contains("\"votes\""));

        let archive = build_archive_prompt();
        assert!(archive.contains("8 archived news articles"));
        assert!(archive.contains("\"category\""));
    }

    #[test]
    fn test_analysis_and_related_prompts() {
        let analysis = build_analysis_prompt("https://example.com/story");
        assert!(analysis.contains("\"https://example.com/story\""));
        assert!(analysis.contains("confidence score (0-100)"));

        let related = build_related_prompt("Tax cuts announced");
        assert!(related.contains("8 related news articles"));
        assert!(related.contains("\"excerpt\""));
    }
}
