pub mod ai_error;
pub mod config;
pub mod news;

pub use ai_error::{AiError, AiErrorKind};
pub use config::{AiConfig, Config};
pub use news::*;
