//! `auto` mode routes from TOML (`[routing]` section)

use hotbox_application::ComplexityRouter;
use hotbox_domain::Complexity;
use serde::{Deserialize, Serialize};

/// Mode text per complexity level; unset levels keep the built-in route.
///
/// ```toml
/// [routing]
/// moderate = "gemini_only"
/// complex = "power_duo"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRoutingConfig {
    pub simple: Option<String>,
    pub moderate: Option<String>,
    pub complex: Option<String>,
    pub multi_faceted: Option<String>,
}

impl FileRoutingConfig {
    pub fn to_router(&self) -> ComplexityRouter {
        [
            (Complexity::Simple, &self.simple),
            (Complexity::Moderate, &self.moderate),
            (Complexity::Complex, &self.complex),
            (Complexity::MultiFaceted, &self.multi_faceted),
        ]
        .into_iter()
        .fold(ComplexityRouter::new(), |router, (level, target)| match target {
            Some(target) => router.with_route(level, target.trim()),
            None => router,
        })
    }
}
