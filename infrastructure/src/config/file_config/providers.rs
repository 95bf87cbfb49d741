//! Provider configuration from TOML (`[providers.<vendor>]` sections)
//!
//! Every field is optional; anything left out falls back to the vendor's
//! built-in defaults when the adapter is built.

use serde::{Deserialize, Serialize};

/// Overrides for one vendor adapter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Register this provider at all (default: true)
    pub enabled: Option<bool>,
    /// Environment variable holding the API key (e.g. "GEMINI_API_KEY")
    pub api_key_env: Option<String>,
    /// Direct API key (not recommended, use the env var instead)
    pub api_key: Option<String>,
    /// API base URL, for proxies or self-hosted gateways
    pub base_url: Option<String>,
    /// Model name sent to the vendor
    pub model: Option<String>,
    /// Max tokens per response
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl FileProviderConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// The `[providers]` table, one entry per built-in vendor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    pub openai: FileProviderConfig,
    pub gemini: FileProviderConfig,
    pub claude: FileProviderConfig,
    pub deepseek: FileProviderConfig,
    pub grok: FileProviderConfig,
    pub huggingface: FileProviderConfig,
}
