//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application types
//! ([`DispatchParams`], [`ModeCatalog`], [`PromptComposer`]) after
//! validation.

mod orchestrator;
mod output;
mod presets;
mod providers;
mod routing;

pub use orchestrator::{FileIdentityConfig, FileOrchestratorConfig};
pub use output::{FileOutputConfig, FileOutputFormat, FileStoreConfig};
pub use presets::FilePresetConfig;
pub use providers::{FileProviderConfig, FileProvidersConfig};
pub use routing::FileRoutingConfig;

use hotbox_application::{DispatchParams, ModeCatalog, PromptComposer};
use hotbox_domain::{PromptTemplate, ProviderId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("model name cannot be empty (providers.{0})")]
    EmptyModelName(String),

    #[error("preset '{name}' is invalid: {reason}")]
    InvalidPreset { name: String, reason: String },

    #[error("orchestrator.arbiter is invalid: {0}")]
    InvalidArbiter(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Dispatch settings
    pub orchestrator: FileOrchestratorConfig,
    /// Persona settings
    pub identity: FileIdentityConfig,
    /// Vendor adapter settings
    pub providers: FileProvidersConfig,
    /// Named modes
    pub presets: BTreeMap<String, FilePresetConfig>,
    /// Targets for `auto` mode
    pub routing: FileRoutingConfig,
    /// Chat store settings
    pub store: FileStoreConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        // Timeout of 0 seconds doesn't make sense
        if self.orchestrator.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        for (vendor, provider) in self.vendor_configs() {
            if let Some(model) = &provider.model
                && model.trim().is_empty()
            {
                return Err(ConfigValidationError::EmptyModelName(
                    vendor.as_str().to_string(),
                ));
            }
        }

        for (name, preset) in &self.presets {
            preset
                .to_mode()
                .map_err(|e| ConfigValidationError::InvalidPreset {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
        }

        self.arbiter()?;
        Ok(())
    }

    /// Built-in vendors paired with their config tables, in listing order
    pub fn vendor_configs(&self) -> [(ProviderId, &FileProviderConfig); 6] {
        [
            (ProviderId::OpenAi, &self.providers.openai),
            (ProviderId::Gemini, &self.providers.gemini),
            (ProviderId::Claude, &self.providers.claude),
            (ProviderId::DeepSeek, &self.providers.deepseek),
            (ProviderId::Grok, &self.providers.grok),
            (ProviderId::HuggingFace, &self.providers.huggingface),
        ]
    }

    fn arbiter(&self) -> Result<Option<ProviderId>, ConfigValidationError> {
        self.orchestrator
            .arbiter
            .as_deref()
            .map(|a| a.parse::<ProviderId>())
            .transpose()
            .map_err(|e| ConfigValidationError::InvalidArbiter(e.to_string()))
    }

    pub fn dispatch_params(&self) -> DispatchParams {
        DispatchParams::default()
            .with_timeout(Duration::from_secs(self.orchestrator.timeout_seconds))
    }

    /// Persona and history settings for outgoing prompts
    pub fn composer(&self) -> PromptComposer {
        let identity = self
            .identity
            .system_prompt
            .clone()
            .unwrap_or_else(|| PromptTemplate::default_identity().to_string());
        PromptComposer::new()
            .with_identity(identity)
            .with_history_turns(self.orchestrator.history_turns)
    }

    /// Presets, default arbiter and `auto` routes. Registry checks happen
    /// separately at startup via [`ModeCatalog::validate`].
    pub fn mode_catalog(&self) -> Result<ModeCatalog, ConfigValidationError> {
        let mut catalog = ModeCatalog::new().with_router(self.routing.to_router());
        for (name, preset) in &self.presets {
            let mode = preset
                .to_mode()
                .map_err(|e| ConfigValidationError::InvalidPreset {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            catalog = catalog.with_preset(name.clone(), mode);
        }
        if let Some(arbiter) = self.arbiter()? {
            catalog = catalog.with_default_arbiter(arbiter);
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotbox_domain::{Complexity, Mode, ModeKind};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[orchestrator]
timeout_seconds = 45
default_mode = "power_duo"
arbiter = "claude"
history_turns = 2

[identity]
system_prompt = "You are Holly."

[providers.gemini]
model = "gemini-1.5-pro"
temperature = 0.2

[providers.grok]
enabled = false

[presets.power_duo]
policy = "consensus"
providers = ["gemini", "deepseek"]

[presets.gemini_only]
policy = "single"
providers = ["gemini"]

[routing]
complex = "power_duo"

[store]
path = "/tmp/hotbox.jsonl"

[output]
format = "answer"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.orchestrator.timeout_seconds, 45);
        assert_eq!(config.orchestrator.default_mode, "power_duo");
        assert_eq!(config.providers.gemini.temperature, Some(0.2));
        assert!(!config.providers.grok.is_enabled());
        assert_eq!(config.presets.len(), 2);
        assert_eq!(config.output.format, Some(FileOutputFormat::Answer));
        assert!(!config.output.color);
        assert!(config.validate().is_ok());

        let catalog = config.mode_catalog().unwrap();
        assert_eq!(
            catalog.get("power_duo"),
            Some(&Mode::Consensus(vec![ProviderId::Gemini, ProviderId::DeepSeek]))
        );
        assert_eq!(
            catalog.get("gemini_only").map(|m| m.kind()),
            Some(ModeKind::Single)
        );
        assert_eq!(catalog.default_arbiter(), Some(&ProviderId::Claude));
        assert_eq!(catalog.router().route(Complexity::Complex), "power_duo");
        assert_eq!(config.dispatch_params().timeout, Duration::from_secs(45));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[orchestrator]
default_mode = "fastest"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.orchestrator.default_mode, "fastest");
        // Defaults should apply
        assert_eq!(config.orchestrator.timeout_seconds, 30);
        assert!(config.presets.is_empty());
        assert!(config.output.color);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dispatch_params().timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let toml_str = r#"
[orchestrator]
timeout_seconds = 0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidTimeout));
    }

    #[test]
    fn test_validate_empty_model_name() {
        let toml_str = r#"
[providers.claude]
model = "  "
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::EmptyModelName("claude".to_string()))
        );
    }

    #[test]
    fn test_validate_bad_preset() {
        let toml_str = r#"
[presets.broken]
policy = "loudest"
providers = ["gemini"]
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidPreset { name, .. }) if name == "broken"
        ));
    }

    #[test]
    fn test_composer_uses_default_identity() {
        let composed = FileConfig::default().composer().compose("Hi", &[]);
        assert!(composed.starts_with(PromptTemplate::default_identity()));
        assert!(composed.ends_with("Hi"));
    }

    #[test]
    fn test_empty_identity_disables_persona() {
        let mut config = FileConfig::default();
        config.identity.system_prompt = Some(String::new());
        assert_eq!(config.composer().compose("Hi", &[]), "Hi");
    }
}
