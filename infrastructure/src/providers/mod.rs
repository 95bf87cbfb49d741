//! Vendor adapters implementing the [`LlmProvider`] port
//!
//! All adapters share one `reqwest::Client` connection pool. Each one owns
//! its [`ProviderSettings`]; a vendor without an API key is still
//! registered and reports an authentication failure when called.

mod anthropic;
mod gemini;
mod http;
mod huggingface;
mod openai_compat;
mod settings;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use huggingface::HuggingFaceProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use settings::ProviderSettings;

use crate::config::FileConfig;
use hotbox_application::{LlmProvider, ProviderRegistry};
use hotbox_domain::ProviderId;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info};

/// Build the adapter for a vendor
///
/// Returns `None` for ids that have no built-in adapter.
pub fn build_provider(settings: ProviderSettings, client: Client) -> Option<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match settings.id.clone() {
        ProviderId::OpenAi | ProviderId::DeepSeek | ProviderId::Grok => {
            Arc::new(OpenAiCompatProvider::new(settings, client))
        }
        ProviderId::Claude => Arc::new(AnthropicProvider::new(settings, client)),
        ProviderId::Gemini => Arc::new(GeminiProvider::new(settings, client)),
        ProviderId::HuggingFace => Arc::new(HuggingFaceProvider::new(settings, client)),
        ProviderId::Custom(_) => return None,
    };
    Some(provider)
}

/// Resolved settings for every enabled vendor, keys looked up with `lookup`
pub fn provider_settings(
    config: &FileConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Vec<ProviderSettings> {
    config
        .vendor_configs()
        .into_iter()
        .filter(|(_, file)| file.is_enabled())
        .filter_map(|(vendor, file)| {
            ProviderSettings::defaults(&vendor)
                .map(|s| s.with_overrides(file).with_key_from(&lookup))
        })
        .collect()
}

/// Register every enabled vendor, reading API keys from the environment
pub fn build_registry(config: &FileConfig, client: Client) -> ProviderRegistry {
    build_registry_with(config, client, |name| std::env::var(name).ok())
}

pub fn build_registry_with(
    config: &FileConfig,
    client: Client,
    lookup: impl Fn(&str) -> Option<String>,
) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for settings in provider_settings(config, lookup) {
        debug!(
            provider = %settings.id,
            model = %settings.model,
            has_key = settings.api_key.is_some(),
            "Registering provider"
        );
        if let Some(provider) = build_provider(settings, client.clone()) {
            registry.register(provider);
        }
    }
    info!(providers = registry.len(), "Provider registry ready");
    registry
}
