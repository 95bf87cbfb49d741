//! Prompt value object

use crate::core::error::DomainError;
use crate::core::session::SessionId;
use crate::orchestration::mode::Mode;

/// A prompt to dispatch to one or more providers (Value Object)
///
/// Carries the user's text, the requested orchestration [`Mode`], and the
/// session every resulting outcome is attributed to. Immutable once built;
/// prompt transforms (persona, history) produce a new text before the
/// prompt is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    text: String,
    mode: Mode,
    session: SessionId,
}

impl Prompt {
    /// Create a prompt in a fresh session
    ///
    /// Fails if the text is empty or only whitespace.
    pub fn new(text: impl Into<String>, mode: Mode) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::EmptyPrompt);
        }
        Ok(Self {
            text,
            mode,
            session: SessionId::new(),
        })
    }

    /// Attribute this prompt to an existing session
    pub fn in_session(mut self, session: SessionId) -> Self {
        self.session = session;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }
}

impl std::fmt::Display for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provider::ProviderId;

    #[test]
    fn test_prompt_creation() {
        let p = Prompt::new("Hello, how are you today?", Mode::Single(ProviderId::Gemini)).unwrap();
        assert_eq!(p.text(), "Hello, how are you today?");
        assert_eq!(p.mode(), &Mode::Single(ProviderId::Gemini));
    }

    #[test]
    fn test_empty_prompt_rejected() {
        let mode = Mode::Single(ProviderId::Gemini);
        assert_eq!(Prompt::new("", mode.clone()), Err(DomainError::EmptyPrompt));
        assert_eq!(Prompt::new(" \n\t", mode), Err(DomainError::EmptyPrompt));
    }

    #[test]
    fn test_in_session() {
        let p = Prompt::new("hi", Mode::Single(ProviderId::Grok))
            .unwrap()
            .in_session(SessionId::from("s-1"));
        assert_eq!(p.session().as_str(), "s-1");
    }
}
