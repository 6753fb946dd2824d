use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while asking a model for a command
#[derive(Debug, Error)]
pub enum LLMError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Rate limit exceeded, retry after {0}s")]
    RateLimitExceeded(u64),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("API key not set (expected environment variable {0})")]
    MissingApiKey(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Anything that turns a question into raw model text
///
/// The returned text is untrusted and is expected to wrap a single command in
/// delimiters (see `CommandExtractor`).
#[async_trait]
pub trait CommandSource: Send + Sync {
    async fn generate(&self, question: &str) -> Result<String, LLMError>;
}
