//! Per-level mode targets for `auto` routing

use hotbox_domain::Complexity;
use std::collections::BTreeMap;

/// Mode text that asks for routing by prompt complexity
pub const AUTO_MODE: &str = "auto";

/// Maps each [`Complexity`] level to the mode text it dispatches with.
///
/// Targets are resolved through [`ModeCatalog::resolve`](super::ModeCatalog::resolve),
/// so a target may be a preset name, an explicit `policy:ids[@arbiter]`
/// or a bare policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexityRouter {
    routes: BTreeMap<Complexity, String>,
}

impl Default for ComplexityRouter {
    fn default() -> Self {
        Self {
            routes: BTreeMap::from([
                (Complexity::Simple, "fastest".to_string()),
                (Complexity::Moderate, "single:gemini".to_string()),
                (Complexity::Complex, "consensus:gemini,deepseek".to_string()),
                (Complexity::MultiFaceted, "consensus:gemini,deepseek".to_string()),
            ]),
        }
    }
}

impl ComplexityRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, level: Complexity, target: impl Into<String>) -> Self {
        self.routes.insert(level, target.into());
        self
    }

    /// Mode text for a level
    pub fn route(&self, level: Complexity) -> &str {
        // Every level is filled by `default` and never removed
        self.routes.get(&level).map(String::as_str).unwrap_or(AUTO_MODE)
    }

    pub fn routes(&self) -> impl Iterator<Item = (Complexity, &str)> {
        self.routes.iter().map(|(level, target)| (*level, target.as_str()))
    }
}
