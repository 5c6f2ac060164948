use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use contracts::domain::chat::Intent;

use super::types::{IntentClassifier, LlmError};

/// Intent classifier backed by an OpenAI-compatible chat endpoint.
pub struct OpenAiIntentClassifier {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiIntentClassifier {
    pub fn new(api_key: String, model: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(config);
        Self { client, model }
    }

    /// Custom endpoint variant for compatible APIs.
    pub fn new_with_endpoint(api_base: String, api_key: String, model: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);
        let client = Client::with_config(config);
        Self { client, model }
    }

    fn system_prompt() -> String {
        let labels: Vec<&str> = Intent::ALL.iter().map(|i| i.as_str()).collect();
        format!(
            "You are an intent classifier for a conversational agent. \
             Possible intents: {}. \
             Given a user message, respond ONLY with the intent label that best matches the message.",
            labels.join(", ")
        )
    }
}

#[async_trait]
impl IntentClassifier for OpenAiIntentClassifier {
    async fn classify(&self, message: &str) -> Result<Intent, LlmError> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(Self::system_prompt())
                .build()
                .map_err(|e| LlmError::InvalidRequest(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(message)
                .build()
                .map_err(|e| LlmError::InvalidRequest(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| LlmError::InvalidRequest(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            let err_str = e.to_string();
            if err_str.contains("401") || err_str.contains("authentication") {
                LlmError::AuthError(err_str)
            } else if err_str.contains("429") || err_str.contains("rate limit") {
                LlmError::RateLimitExceeded
            } else {
                LlmError::ApiError(err_str)
            }
        })?;

        let label = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        // Unknown model output is not an error; it just means "other".
        Ok(Intent::parse(&label).unwrap_or(Intent::Other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_lists_every_label() {
        let prompt = OpenAiIntentClassifier::system_prompt();
        for intent in Intent::ALL {
            assert!(
                prompt.contains(intent.as_str()),
                "prompt is missing {}",
                intent
            );
        }
    }
}
