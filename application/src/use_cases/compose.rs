//! Prompt composition
//!
//! Builds the text providers actually receive: recent conversation turns
//! first, then the persona on top.

use hotbox_domain::{ChatTurn, PromptTemplate};

/// Pre-dispatch prompt transform
#[derive(Debug, Clone, Default)]
pub struct PromptComposer {
    identity: Option<String>,
    history_turns: usize,
}

impl PromptComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Number of prior turns to include; `0` disables history
    pub fn with_history_turns(mut self, turns: usize) -> Self {
        self.history_turns = turns;
        self
    }

    pub fn history_turns(&self) -> usize {
        self.history_turns
    }

    pub fn uses_history(&self) -> bool {
        self.history_turns > 0
    }

    pub fn compose(&self, text: &str, history: &[ChatTurn]) -> String {
        let text = PromptTemplate::with_history(history, text, self.history_turns);
        match &self.identity {
            Some(identity) => PromptTemplate::with_identity(identity, &text),
            None => text,
        }
    }
}
