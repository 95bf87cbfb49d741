//! OpenAI-compatible chat completions adapter
//!
//! Serves OpenAI itself plus DeepSeek and Grok, which expose the same
//! `/chat/completions` API.

use super::http::send_json;
use super::settings::ProviderSettings;
use async_trait::async_trait;
use hotbox_application::{LlmProvider, ProviderError};
use hotbox_domain::{Completion, ProviderId};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: Option<u32>,
}

impl ChatResponse {
    fn into_completion(self) -> Result<Completion, ProviderError> {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::MalformedResponse("no choices[0].message.content".to_string())
            })?;

        let mut completion = Completion::new(text);
        if let Some(model) = self.model {
            completion = completion.with_model(model);
        }
        if let Some(tokens) = self.usage.and_then(|u| u.total_tokens) {
            completion = completion.with_tokens(tokens);
        }
        Ok(completion)
    }
}

/// Adapter for any OpenAI-style `/chat/completions` endpoint
pub struct OpenAiCompatProvider {
    settings: ProviderSettings,
    client: Client,
}

impl OpenAiCompatProvider {
    pub fn new(settings: ProviderSettings, client: Client) -> Self {
        Self { settings, client }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn id(&self) -> &ProviderId {
        &self.settings.id
    }

    fn has_credential(&self) -> bool {
        self.settings.api_key.is_some()
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, ProviderError> {
        let key = self.settings.require_key()?;
        let body = ChatRequest {
            model: &self.settings.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        debug!(provider = %self.settings.id, model = %self.settings.model, "Sending chat completion");
        let request = self
            .client
            .post(self.settings.endpoint("chat/completions"))
            .bearer_auth(key)
            .json(&body);

        send_json::<ChatResponse>(request).await?.into_completion()
    }
}
