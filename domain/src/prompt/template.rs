//! Prompt templates

use crate::core::provider::ProviderId;
use crate::session::entities::{ChatTurn, Role};

/// Templates for building the text sent to providers
pub struct PromptTemplate;

impl PromptTemplate {
    /// Default persona injected ahead of every user prompt
    pub fn default_identity() -> &'static str {
        r#"You are part of Holly Hot Box, a multi-AI assistant where several models answer the same question.
Answer the user's question directly and accurately. Be concise but complete."#
    }

    /// Prepend a persona/identity block to the user's text
    pub fn with_identity(identity: &str, text: &str) -> String {
        let identity = identity.trim();
        if identity.is_empty() {
            return text.to_string();
        }
        format!("{}\n\n{}", identity, text)
    }

    /// Prepend the most recent `max_turns` conversation turns to the text
    pub fn with_history(history: &[ChatTurn], text: &str, max_turns: usize) -> String {
        if history.is_empty() || max_turns == 0 {
            return text.to_string();
        }

        let start = history.len().saturating_sub(max_turns);
        let mut prompt = String::from("Conversation so far:\n");
        for turn in &history[start..] {
            let speaker = match turn.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            prompt.push_str(&format!("\n{}: {}\n", speaker, turn.content));
        }
        prompt.push_str(&format!("\nCurrent question:\n{}", text));
        prompt
    }

    /// Request asking the arbiter to pick the best candidate answer
    ///
    /// Candidates are labelled with their provider id so the arbiter can
    /// answer with just that id.
    pub fn arbiter_prompt(question: &str, candidates: &[(ProviderId, String)]) -> String {
        let names = candidates
            .iter()
            .map(|(id, _)| id.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let mut prompt = format!(
            r#"Evaluate these AI responses and select the BEST one.

Original question: {}

Responses:
"#,
            question
        );

        for (id, text) in candidates {
            prompt.push_str(&format!("\n--- {} ---\n{}\n", id, text));
        }

        prompt.push_str(&format!(
            r#"
Which provider gave the best response? Reply with ONLY the provider name ({}).
If none is adequate, reply with an improved answer instead."#,
            names
        ));

        prompt
    }

    /// Tiny prompt used to check a provider's credentials end to end
    pub fn health_check() -> &'static str {
        "Reply with the single word: ready"
    }
}
