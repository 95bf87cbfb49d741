//! Hugging Face Inference API adapter (text generation)

use super::http::send_json;
use super::settings::ProviderSettings;
use async_trait::async_trait;
use hotbox_application::{LlmProvider, ProviderError};
use hotbox_domain::{Completion, ProviderId};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Parameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct Generated {
    #[serde(default)]
    generated_text: Option<String>,
}

fn into_completion(generated: Vec<Generated>, model: &str) -> Result<Completion, ProviderError> {
    generated
        .into_iter()
        .next()
        .and_then(|g| g.generated_text)
        .filter(|t| !t.trim().is_empty())
        .map(|text| Completion::new(text.trim()).with_model(model))
        .ok_or_else(|| ProviderError::MalformedResponse("no [0].generated_text".to_string()))
}

/// Adapter for hosted text-generation models
pub struct HuggingFaceProvider {
    settings: ProviderSettings,
    client: Client,
}

impl HuggingFaceProvider {
    pub fn new(settings: ProviderSettings, client: Client) -> Self {
        Self { settings, client }
    }
}

#[async_trait]
impl LlmProvider for HuggingFaceProvider {
    fn id(&self) -> &ProviderId {
        &self.settings.id
    }

    fn has_credential(&self) -> bool {
        self.settings.api_key.is_some()
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, ProviderError> {
        let key = self.settings.require_key()?;
        let body = GenerationRequest {
            inputs: prompt,
            parameters: Parameters {
                max_new_tokens: self.settings.max_tokens,
                temperature: self.settings.temperature,
                return_full_text: false,
            },
        };

        debug!(provider = %self.settings.id, model = %self.settings.model, "Sending text generation");
        let request = self
            .client
            .post(self.settings.endpoint(&self.settings.model))
            .bearer_auth(key)
            .json(&body);

        let generated = send_json::<Vec<Generated>>(request).await?;
        into_completion(generated, &self.settings.model)
    }
}
