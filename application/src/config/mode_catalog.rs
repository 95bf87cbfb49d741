//! Named modes and mode resolution
//!
//! Turns the text a user types (`--mode consensus`, `--mode power_duo`,
//! `--mode best:gemini,claude@openai`) into a checked [`Mode`]. The text
//! `auto` defers the choice to each prompt, see [`ModeChoice`].

use super::complexity_router::{AUTO_MODE, ComplexityRouter};
use crate::registry::ProviderRegistry;
use crate::use_cases::dispatch::DispatchError;
use hotbox_domain::{ComplexityReport, DomainError, Mode, ModeKind, ProviderId};
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// Preset modes, the fallback arbiter for bare `best`, and `auto` routes
#[derive(Debug, Clone, Default)]
pub struct ModeCatalog {
    presets: BTreeMap<String, Mode>,
    default_arbiter: Option<ProviderId>,
    router: ComplexityRouter,
}

/// A mode fixed up front, or one picked per prompt by complexity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeChoice {
    Fixed(Mode),
    Auto,
}

impl fmt::Display for ModeChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeChoice::Fixed(mode) => write!(f, "{}", mode),
            ModeChoice::Auto => write!(f, "{}", AUTO_MODE),
        }
    }
}

impl ModeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preset(mut self, name: impl Into<String>, mode: Mode) -> Self {
        self.presets.insert(name.into(), mode);
        self
    }

    pub fn with_default_arbiter(mut self, arbiter: ProviderId) -> Self {
        self.default_arbiter = Some(arbiter);
        self
    }

    pub fn with_router(mut self, router: ComplexityRouter) -> Self {
        self.router = router;
        self
    }

    pub fn router(&self) -> &ComplexityRouter {
        &self.router
    }

    pub fn is_auto(spec: &str) -> bool {
        spec.trim().eq_ignore_ascii_case(AUTO_MODE)
    }

    pub fn get(&self, name: &str) -> Option<&Mode> {
        self.presets.get(name)
    }

    pub fn presets(&self) -> impl Iterator<Item = (&str, &Mode)> {
        self.presets.iter().map(|(name, mode)| (name.as_str(), mode))
    }

    pub fn default_arbiter(&self) -> Option<&ProviderId> {
        self.default_arbiter.as_ref()
    }

    /// Check every preset (and the default arbiter) against the registry.
    ///
    /// Run once at startup so a bad preset fails before any prompt is sent.
    pub fn validate(&self, registry: &ProviderRegistry) -> Result<(), DispatchError> {
        for (name, mode) in &self.presets {
            registry.check_mode(mode).map_err(|e| match e {
                DispatchError::InvalidMode(msg) => {
                    DispatchError::InvalidMode(format!("preset '{}': {}", name, msg))
                }
                other => other,
            })?;
        }
        match &self.default_arbiter {
            Some(arbiter) if !registry.contains(arbiter) => {
                Err(DispatchError::UnknownProvider(arbiter.clone()))
            }
            _ => Ok(()),
        }
    }

    /// Resolve user text into a mode the registry can serve.
    ///
    /// Lookup order: preset name, explicit `policy:ids[@arbiter]`, then a
    /// bare policy applied to every registered provider.
    pub fn resolve(&self, spec: &str, registry: &ProviderRegistry) -> Result<Mode, DispatchError> {
        let spec = spec.trim();
        let mode = if let Some(preset) = self.presets.get(spec) {
            preset.clone()
        } else if spec.contains(':') {
            spec.parse::<Mode>()?
        } else {
            self.expand_bare(spec.parse::<ModeKind>()?, registry)?
        };
        registry.check_mode(&mode)?;
        Ok(mode)
    }

    /// Like [`resolve`](Self::resolve), but `auto` yields [`ModeChoice::Auto`]
    /// once every route has been checked against the registry
    pub fn choose(&self, spec: &str, registry: &ProviderRegistry) -> Result<ModeChoice, DispatchError> {
        if Self::is_auto(spec) {
            self.validate_routes(registry)?;
            Ok(ModeChoice::Auto)
        } else {
            Ok(ModeChoice::Fixed(self.resolve(spec, registry)?))
        }
    }

    /// The mode a prompt dispatches with under `choice`
    pub fn mode_for(
        &self,
        choice: &ModeChoice,
        text: &str,
        registry: &ProviderRegistry,
    ) -> Result<Mode, DispatchError> {
        match choice {
            ModeChoice::Fixed(mode) => Ok(mode.clone()),
            ModeChoice::Auto => self.route(text, registry),
        }
    }

    /// Score the prompt and resolve the route for its level
    pub fn route(&self, text: &str, registry: &ProviderRegistry) -> Result<Mode, DispatchError> {
        let report = ComplexityReport::assess(text);
        let target = self.router.route(report.level);
        let mode = self.resolve_route(report.level.as_str(), target, registry)?;
        info!(
            level = %report.level,
            score = report.score,
            signals = ?report.signals,
            mode = %mode,
            "Routed prompt by complexity"
        );
        Ok(mode)
    }

    /// Check that every `auto` route resolves against the registry
    pub fn validate_routes(&self, registry: &ProviderRegistry) -> Result<(), DispatchError> {
        for (level, target) in self.router.routes() {
            self.resolve_route(level.as_str(), target, registry)?;
        }
        Ok(())
    }

    fn resolve_route(
        &self,
        level: &str,
        target: &str,
        registry: &ProviderRegistry,
    ) -> Result<Mode, DispatchError> {
        if Self::is_auto(target) {
            return Err(DispatchError::InvalidMode(format!(
                "route '{}' cannot target auto",
                level
            )));
        }
        self.resolve(target, registry).map_err(|e| match e {
            DispatchError::InvalidMode(msg) => {
                DispatchError::InvalidMode(format!("route '{}': {}", level, msg))
            }
            other => other,
        })
    }

    /// Build a mode from a policy plus explicit provider and arbiter
    /// choices, filling gaps from the registry and catalog defaults
    pub fn build(
        &self,
        kind: ModeKind,
        providers: Vec<ProviderId>,
        arbiter: Option<ProviderId>,
        registry: &ProviderRegistry,
    ) -> Result<Mode, DispatchError> {
        let providers = if providers.is_empty() && kind != ModeKind::Single {
            registry.ids()
        } else {
            providers
        };
        let arbiter = arbiter.or_else(|| self.default_arbiter.clone());
        let mode = Mode::from_parts(kind, providers, arbiter)?;
        registry.check_mode(&mode)?;
        Ok(mode)
    }

    fn expand_bare(&self, kind: ModeKind, registry: &ProviderRegistry) -> Result<Mode, DispatchError> {
        if registry.is_empty() {
            return Err(DispatchError::NoProviders);
        }
        match kind {
            ModeKind::Single => Err(DomainError::InvalidMode(
                "single mode needs a provider (single:<id>)".to_string(),
            )
            .into()),
            ModeKind::Best if self.default_arbiter.is_none() => Err(DomainError::InvalidMode(
                "best mode needs an arbiter (best:<ids>@<arbiter>)".to_string(),
            )
            .into()),
            _ => Ok(Mode::from_parts(
                kind,
                registry.ids(),
                self.default_arbiter.clone(),
            )?),
        }
    }
}
