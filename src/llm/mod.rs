//! Completion API abstraction.
//!
//! The hosted completion service is a black-box RPC from the bot's point of
//! view; this module defines the one exchange the orchestrator needs and
//! the backend that speaks the chat-completions wire format.

pub mod openai;
mod retry;
mod types;

pub use self::types::*;

use async_trait::async_trait;

use crate::config::Config;

/// A hosted completion API, reduced to the single exchange the bot needs.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send one completion request and return the first candidate together
    /// with its usage report.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;
}

/// Errors from the completion API boundary.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("configuration error: {0}")]
    Config(String),
}

/// Create the backend for the configured API endpoint.
pub fn create_backend(config: &Config) -> Result<Box<dyn CompletionBackend>, LlmError> {
    if config.api_key.is_empty() {
        return Err(LlmError::Config("completion API key is empty".to_string()));
    }
    Ok(Box::new(openai::OpenAiBackend::new(
        config.api_key.clone(),
        config.api_base.clone(),
    )))
}
