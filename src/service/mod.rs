pub mod api_key;
pub mod cache;
pub mod cache_keys;
pub mod errors;
pub mod llm;
pub mod news;
pub mod parse;
pub mod prompts;

pub use cache::FeedCache;
pub use llm::LlmClient;
pub use news::{AnalysisRequest, ArchiveFilter, NewsService};
