pub mod openai_provider;
pub mod types;

pub use openai_provider::OpenAiIntentClassifier;
pub use types::{IntentClassifier, LlmError};
