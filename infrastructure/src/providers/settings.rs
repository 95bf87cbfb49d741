//! Resolved per-vendor adapter settings

use crate::config::FileProviderConfig;
use hotbox_application::ProviderError;
use hotbox_domain::ProviderId;
use std::fmt;

/// Endpoint, model and credential for one adapter
#[derive(Clone, PartialEq)]
pub struct ProviderSettings {
    pub id: ProviderId,
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ProviderSettings {
    /// Built-in defaults for a vendor; `None` for custom ids
    pub fn defaults(vendor: &ProviderId) -> Option<Self> {
        let (env, base_url, model, max_tokens) = match vendor {
            ProviderId::OpenAi => ("OPENAI_API_KEY", "https://api.openai.com/v1", "gpt-4o", 2000),
            ProviderId::Gemini => (
                "GEMINI_API_KEY",
                "https://generativelanguage.googleapis.com/v1beta",
                "gemini-2.0-flash-exp",
                2000,
            ),
            ProviderId::Claude => (
                "CLAUDE_API_KEY",
                "https://api.anthropic.com/v1",
                "claude-sonnet-4-20250514",
                2000,
            ),
            ProviderId::DeepSeek => (
                "DEEPSEEK_API_KEY",
                "https://api.deepseek.com/v1",
                "deepseek-chat",
                2000,
            ),
            ProviderId::Grok => ("GROK_API_KEY", "https://api.x.ai/v1", "grok-beta", 2000),
            ProviderId::HuggingFace => (
                "HUGGINGFACE_API_KEY",
                "https://api-inference.huggingface.co/models",
                "meta-llama/Meta-Llama-3-8B-Instruct",
                500,
            ),
            ProviderId::Custom(_) => return None,
        };

        Some(Self {
            id: vendor.clone(),
            api_key: None,
            api_key_env: env.to_string(),
            base_url: base_url.to_string(),
            model: model.to_string(),
            max_tokens,
            temperature: 0.7,
        })
    }

    /// Apply a `[providers.<vendor>]` table on top
    pub fn with_overrides(mut self, file: &FileProviderConfig) -> Self {
        if let Some(env) = &file.api_key_env {
            self.api_key_env = env.clone();
        }
        if let Some(key) = &file.api_key {
            self.api_key = Some(key.clone());
        }
        if let Some(url) = &file.base_url {
            self.base_url = url.clone();
        }
        if let Some(model) = &file.model {
            self.model = model.clone();
        }
        if let Some(max_tokens) = file.max_tokens {
            self.max_tokens = max_tokens;
        }
        if let Some(temperature) = file.temperature {
            self.temperature = temperature;
        }
        self
    }

    /// Fill the key from the environment unless one was configured directly
    pub fn with_key_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.api_key.is_none() {
            self.api_key = lookup(&self.api_key_env).filter(|k| !k.trim().is_empty());
        }
        self
    }

    /// The API key, or `MissingCredential` naming the variable to set
    pub fn require_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ProviderError::MissingCredential(self.api_key_env.clone()))
    }

    /// Base URL joined with a path, without doubled slashes
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

// API keys stay out of logs
impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("id", &self.id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_env", &self.api_key_env)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}
