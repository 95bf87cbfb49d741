//! Provider identifier value object

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifies an LLM provider (Value Object)
///
/// Each vendor the chat UI talks to has a dedicated variant. `Custom` covers
/// adapters registered under any other name (self-hosted endpoints, test
/// doubles).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderId {
    OpenAi,
    Gemini,
    Claude,
    DeepSeek,
    Grok,
    HuggingFace,
    Custom(String),
}

impl ProviderId {
    /// Get the string identifier for this provider
    pub fn as_str(&self) -> &str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Gemini => "gemini",
            ProviderId::Claude => "claude",
            ProviderId::DeepSeek => "deepseek",
            ProviderId::Grok => "grok",
            ProviderId::HuggingFace => "huggingface",
            ProviderId::Custom(s) => s,
        }
    }

    /// Human-readable vendor name for display
    pub fn display_name(&self) -> &str {
        match self {
            ProviderId::OpenAi => "OpenAI GPT-4o",
            ProviderId::Gemini => "Google Gemini",
            ProviderId::Claude => "Anthropic Claude",
            ProviderId::DeepSeek => "DeepSeek",
            ProviderId::Grok => "xAI Grok",
            ProviderId::HuggingFace => "Hugging Face",
            ProviderId::Custom(s) => s,
        }
    }

    /// All built-in vendors, in the order the UI lists them
    pub fn vendors() -> Vec<ProviderId> {
        vec![
            ProviderId::OpenAi,
            ProviderId::Gemini,
            ProviderId::Claude,
            ProviderId::DeepSeek,
            ProviderId::Grok,
            ProviderId::HuggingFace,
        ]
    }

    /// Check if this is one of the built-in vendors
    pub fn is_vendor(&self) -> bool {
        !matches!(self, ProviderId::Custom(_))
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::InvalidProvider(
                "provider name cannot be empty".to_string(),
            ));
        }
        Ok(match s.to_ascii_lowercase().as_str() {
            "openai" | "gpt" => ProviderId::OpenAi,
            "gemini" | "google" => ProviderId::Gemini,
            "claude" | "anthropic" => ProviderId::Claude,
            "deepseek" => ProviderId::DeepSeek,
            "grok" | "xai" => ProviderId::Grok,
            "huggingface" | "hf" => ProviderId::HuggingFace,
            _ => ProviderId::Custom(s.to_string()),
        })
    }
}

impl Serialize for ProviderId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProviderId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
