//! Orchestrator and identity configuration from TOML
//! (`[orchestrator]` and `[identity]` sections)

use serde::{Deserialize, Serialize};

/// Raw orchestrator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestratorConfig {
    /// Per-call deadline in seconds
    pub timeout_seconds: u64,
    /// Mode used when `--mode` is not given (preset name, policy, or
    /// `policy:ids[@arbiter]`)
    pub default_mode: String,
    /// Arbiter used by a bare `best` mode
    pub arbiter: Option<String>,
    /// Prior chat turns included as context (0 disables history)
    pub history_turns: usize,
}

impl Default for FileOrchestratorConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            default_mode: "consensus".to_string(),
            arbiter: None,
            history_turns: 6,
        }
    }
}

/// Persona injected ahead of every prompt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileIdentityConfig {
    /// Replaces the built-in persona; an empty string disables it
    pub system_prompt: Option<String>,
}
