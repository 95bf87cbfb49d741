//! Anthropic messages API adapter (Claude)

use super::http::send_json;
use super::settings::ProviderSettings;
use async_trait::async_trait;
use hotbox_application::{LlmProvider, ProviderError};
use hotbox_domain::{Completion, ProviderId};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl MessagesResponse {
    fn into_completion(self) -> Result<Completion, ProviderError> {
        let text: String = self.content.into_iter().filter_map(|b| b.text).collect();
        if text.trim().is_empty() {
            return Err(ProviderError::MalformedResponse(
                "no text content blocks".to_string(),
            ));
        }

        let mut completion = Completion::new(text);
        if let Some(model) = self.model {
            completion = completion.with_model(model);
        }
        if let Some(usage) = self.usage {
            completion = completion.with_tokens(usage.input_tokens + usage.output_tokens);
        }
        Ok(completion)
    }
}

/// Adapter for Claude via the Anthropic messages API
pub struct AnthropicProvider {
    settings: ProviderSettings,
    client: Client,
}

impl AnthropicProvider {
    pub fn new(settings: ProviderSettings, client: Client) -> Self {
        Self { settings, client }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn id(&self) -> &ProviderId {
        &self.settings.id
    }

    fn has_credential(&self) -> bool {
        self.settings.api_key.is_some()
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, ProviderError> {
        let key = self.settings.require_key()?;
        let body = MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(provider = %self.settings.id, model = %self.settings.model, "Sending messages request");
        let request = self
            .client
            .post(self.settings.endpoint("messages"))
            .header("x-api-key", key)
            .header("anthropic-version", API_VERSION)
            .json(&body);

        send_json::<MessagesResponse>(request).await?.into_completion()
    }
}
