//! Mode presets from TOML (`[presets.<name>]` sections)

use hotbox_domain::{DomainError, Mode, ModeKind, ProviderId};
use serde::{Deserialize, Serialize};

/// A named mode, e.g.
///
/// ```toml
/// [presets.power_duo]
/// policy = "consensus"
/// providers = ["gemini", "deepseek"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePresetConfig {
    pub policy: String,
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub arbiter: Option<String>,
}

impl FilePresetConfig {
    /// Parse into a domain [`Mode`]
    pub fn to_mode(&self) -> Result<Mode, DomainError> {
        let kind: ModeKind = self.policy.parse()?;
        let providers = self
            .providers
            .iter()
            .map(|p| p.parse::<ProviderId>())
            .collect::<Result<Vec<_>, _>>()?;
        let arbiter = self
            .arbiter
            .as_deref()
            .map(str::parse::<ProviderId>)
            .transpose()?;
        Mode::from_parts(kind, providers, arbiter)
    }
}
