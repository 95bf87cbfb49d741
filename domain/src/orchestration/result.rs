//! Dispatch result value object.

use crate::core::provider::ProviderId;
use crate::orchestration::mode::ModeKind;
use crate::orchestration::outcome::Outcome;
use serde::{Deserialize, Serialize};

/// Everything a single dispatch produced
///
/// - `single`: `outcomes` holds the one outcome, `selected` repeats it
/// - `fastest`: `outcomes` holds the winner only, `selected` repeats it
/// - `consensus` / `parallel`: `outcomes` holds one entry per queried
///   provider in declaration order, nothing is selected
/// - `best`: like consensus, plus the arbiter's own outcome and the
///   selected winner (arbiter pick or first success)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationResult {
    /// Policy that produced this result
    pub mode: ModeKind,
    /// The user's prompt text (before persona or history are added)
    pub prompt: String,
    /// Per-provider outcomes
    pub outcomes: Vec<Outcome>,
    /// The arbiter's outcome (`best` mode only, absent if it was never asked)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arbiter: Option<Outcome>,
    /// The answer chosen by the policy, if the policy chooses one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<Outcome>,
}

impl OrchestrationResult {
    /// Result of `single` mode
    pub fn single(prompt: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            mode: ModeKind::Single,
            prompt: prompt.into(),
            outcomes: vec![outcome.clone()],
            arbiter: None,
            selected: Some(outcome),
        }
    }

    /// Result of `fastest` mode
    pub fn fastest(prompt: impl Into<String>, winner: Outcome) -> Self {
        Self {
            mode: ModeKind::Fastest,
            prompt: prompt.into(),
            outcomes: vec![winner.clone()],
            arbiter: None,
            selected: Some(winner),
        }
    }

    /// Result of a collect-all mode (`consensus` or `parallel`)
    pub fn collected(mode: ModeKind, prompt: impl Into<String>, outcomes: Vec<Outcome>) -> Self {
        Self {
            mode,
            prompt: prompt.into(),
            outcomes,
            arbiter: None,
            selected: None,
        }
    }

    /// Result of `best` mode
    pub fn best(
        prompt: impl Into<String>,
        outcomes: Vec<Outcome>,
        arbiter: Option<Outcome>,
        selected: Option<Outcome>,
    ) -> Self {
        Self {
            mode: ModeKind::Best,
            prompt: prompt.into(),
            outcomes,
            arbiter,
            selected,
        }
    }

    /// The outcome to show as "the answer"
    ///
    /// The selected outcome when the policy picked one, otherwise the first
    /// success, otherwise the first outcome.
    pub fn answer(&self) -> Option<&Outcome> {
        self.selected
            .as_ref()
            .or_else(|| self.outcomes.iter().find(|o| o.is_success()))
            .or_else(|| self.outcomes.first())
    }

    /// Text of [`answer`](Self::answer), if it is a success
    pub fn answer_text(&self) -> Option<&str> {
        self.answer().and_then(Outcome::text)
    }

    pub fn successes(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Providers in the order their outcomes are reported
    pub fn providers(&self) -> Vec<&ProviderId> {
        self.outcomes.iter().map(Outcome::provider).collect()
    }

    pub fn all_failed(&self) -> bool {
        self.outcomes.iter().all(|o| !o.is_success())
    }

    /// Tokens billed across every call, arbiter included
    pub fn total_tokens(&self) -> u32 {
        self.outcomes
            .iter()
            .chain(self.arbiter.as_ref())
            .filter_map(Outcome::tokens)
            .sum()
    }
}
