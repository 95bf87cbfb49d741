//! Orchestration modes.
//!
//! A [`Mode`] names the selection policy for a prompt together with the
//! providers it involves:
//!
//! | Mode | Providers queried | Returned |
//! |------|-------------------|----------|
//! | `single` | one | that provider's outcome |
//! | `fastest` | all, concurrently | first success (or quickest failure) |
//! | `consensus` | all, concurrently | every outcome, declaration order |
//! | `best` | all, then the arbiter | every outcome plus the arbiter's pick |
//! | `parallel` | all, concurrently | same as consensus, rendered side by side |
//!
//! # Text form
//!
//! ```text
//! single:gemini
//! fastest:gemini,deepseek,grok
//! consensus:openai,claude
//! best:gemini,claude,deepseek@openai
//! ```

use crate::core::error::DomainError;
use crate::core::provider::ProviderId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// The policy part of a mode, without its providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    Single,
    Fastest,
    Consensus,
    Best,
    Parallel,
}

impl ModeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModeKind::Single => "single",
            ModeKind::Fastest => "fastest",
            ModeKind::Consensus => "consensus",
            ModeKind::Best => "best",
            ModeKind::Parallel => "parallel",
        }
    }

    /// Short description for help output
    pub fn description(&self) -> &'static str {
        match self {
            ModeKind::Single => "Ask exactly one provider",
            ModeKind::Fastest => "Ask everyone, keep the first success",
            ModeKind::Consensus => "Ask everyone, show every answer",
            ModeKind::Best => "Ask everyone, let an arbiter pick the best answer",
            ModeKind::Parallel => "Ask everyone, show answers side by side",
        }
    }

    pub fn all() -> [ModeKind; 5] {
        [
            ModeKind::Single,
            ModeKind::Fastest,
            ModeKind::Consensus,
            ModeKind::Best,
            ModeKind::Parallel,
        ]
    }

    /// Whether every queried outcome ends up in the result
    pub fn collects_all(&self) -> bool {
        matches!(
            self,
            ModeKind::Consensus | ModeKind::Best | ModeKind::Parallel
        )
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ModeKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "solo" => Ok(ModeKind::Single),
            "fastest" => Ok(ModeKind::Fastest),
            "consensus" => Ok(ModeKind::Consensus),
            "best" => Ok(ModeKind::Best),
            "parallel" => Ok(ModeKind::Parallel),
            other => Err(DomainError::InvalidMode(format!(
                "unknown mode '{}' (expected single, fastest, consensus, best or parallel)",
                other
            ))),
        }
    }
}

/// Orchestration mode for a prompt (Value Object)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Single(ProviderId),
    Fastest(Vec<ProviderId>),
    Consensus(Vec<ProviderId>),
    Best {
        providers: Vec<ProviderId>,
        arbiter: ProviderId,
    },
    Parallel(Vec<ProviderId>),
}

impl Mode {
    /// Build a mode from its policy and provider list.
    ///
    /// `single` takes exactly one provider; `best` requires an arbiter.
    /// The arbiter is ignored for every other policy.
    pub fn from_parts(
        kind: ModeKind,
        providers: Vec<ProviderId>,
        arbiter: Option<ProviderId>,
    ) -> Result<Self, DomainError> {
        let mode = match kind {
            ModeKind::Single => {
                let mut providers = providers;
                if providers.len() != 1 {
                    return Err(DomainError::InvalidMode(format!(
                        "single mode takes exactly one provider, got {}",
                        providers.len()
                    )));
                }
                Mode::Single(providers.remove(0))
            }
            ModeKind::Fastest => Mode::Fastest(providers),
            ModeKind::Consensus => Mode::Consensus(providers),
            ModeKind::Parallel => Mode::Parallel(providers),
            ModeKind::Best => {
                let arbiter = arbiter.ok_or_else(|| {
                    DomainError::InvalidMode("best mode requires an arbiter".to_string())
                })?;
                Mode::Best { providers, arbiter }
            }
        };
        mode.validate()?;
        Ok(mode)
    }

    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Single(_) => ModeKind::Single,
            Mode::Fastest(_) => ModeKind::Fastest,
            Mode::Consensus(_) => ModeKind::Consensus,
            Mode::Best { .. } => ModeKind::Best,
            Mode::Parallel(_) => ModeKind::Parallel,
        }
    }

    /// Providers queried with the user's prompt, in declaration order
    pub fn providers(&self) -> &[ProviderId] {
        match self {
            Mode::Single(p) => std::slice::from_ref(p),
            Mode::Fastest(ps) | Mode::Consensus(ps) | Mode::Parallel(ps) => ps,
            Mode::Best { providers, .. } => providers,
        }
    }

    /// The arbiter, for `best` mode
    pub fn arbiter(&self) -> Option<&ProviderId> {
        match self {
            Mode::Best { arbiter, .. } => Some(arbiter),
            _ => None,
        }
    }

    /// Every provider this mode may invoke (queried set plus arbiter)
    pub fn referenced_providers(&self) -> impl Iterator<Item = &ProviderId> {
        self.providers().iter().chain(self.arbiter())
    }

    /// Check structural validity: a non-empty provider set without duplicates
    pub fn validate(&self) -> Result<(), DomainError> {
        let providers = self.providers();
        if providers.is_empty() {
            return Err(DomainError::InvalidMode(format!(
                "{} mode needs at least one provider",
                self.kind()
            )));
        }
        // Custom ids keep their case but still collide case-insensitively
        let mut seen = HashSet::new();
        for provider in providers {
            if !seen.insert(provider.as_str().to_ascii_lowercase()) {
                return Err(DomainError::InvalidMode(format!(
                    "provider '{}' listed twice",
                    provider
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids = self
            .providers()
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{}:{}", self.kind(), ids)?;
        if let Some(arbiter) = self.arbiter() {
            write!(f, "@{}", arbiter)?;
        }
        Ok(())
    }
}

impl FromStr for Mode {
    type Err = DomainError;

    /// Parse `policy:id,id[@arbiter]`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, rest) = s.split_once(':').ok_or_else(|| {
            DomainError::InvalidMode(format!("'{}' has no provider list", s.trim()))
        })?;
        let kind: ModeKind = kind.parse()?;

        let (list, arbiter) = match rest.split_once('@') {
            Some((list, arbiter)) => (list, Some(arbiter.parse::<ProviderId>()?)),
            None => (rest, None),
        };

        let providers = list
            .split(',')
            .filter(|p| !p.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<ProviderId>, _>>()?;

        Mode::from_parts(kind, providers, arbiter)
    }
}
