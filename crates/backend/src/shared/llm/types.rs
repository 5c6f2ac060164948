use async_trait::async_trait;
use contracts::domain::chat::Intent;
use thiserror::Error;

/// LLM provider errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

/// Opaque `classify(text) -> label` capability.
///
/// The conversational layer only ever sees this trait; which model sits
/// behind it is a deployment concern.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, message: &str) -> Result<Intent, LlmError>;
}
