//! Google Generative Language adapter (Gemini)

use super::http::send_json;
use super::settings::ProviderSettings;
use async_trait::async_trait;
use hotbox_application::{LlmProvider, ProviderError};
use hotbox_domain::{Completion, ProviderId};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    total_token_count: Option<u32>,
}

impl GenerateResponse {
    fn into_completion(self) -> Result<Completion, ProviderError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(ProviderError::MalformedResponse(
                "no candidates[0].content.parts text".to_string(),
            ));
        }

        let mut completion = Completion::new(text);
        if let Some(model) = self.model_version {
            completion = completion.with_model(model);
        }
        if let Some(tokens) = self.usage_metadata.and_then(|u| u.total_token_count) {
            completion = completion.with_tokens(tokens);
        }
        Ok(completion)
    }
}

/// Adapter for Gemini `generateContent`
pub struct GeminiProvider {
    settings: ProviderSettings,
    client: Client,
}

impl GeminiProvider {
    pub fn new(settings: ProviderSettings, client: Client) -> Self {
        Self { settings, client }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn id(&self) -> &ProviderId {
        &self.settings.id
    }

    fn has_credential(&self) -> bool {
        self.settings.api_key.is_some()
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, ProviderError> {
        let key = self.settings.require_key()?;
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                max_output_tokens: self.settings.max_tokens,
            },
        };

        // Model is part of the URL, the key goes in the query string
        let url = self
            .settings
            .endpoint(&format!("models/{}:generateContent", self.settings.model));
        debug!(provider = %self.settings.id, model = %self.settings.model, "Sending generateContent");
        let request = self.client.post(url).query(&[("key", key)]).json(&body);

        send_json::<GenerateResponse>(request).await?.into_completion()
    }
}
