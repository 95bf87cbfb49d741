//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Prompt cannot be empty")]
    EmptyPrompt,

    #[error("Invalid provider: {0}")]
    InvalidProvider(String),

    #[error("Invalid mode: {0}")]
    InvalidMode(String),
}

impl DomainError {
    /// Check if this error was caused by a malformed mode description
    pub fn is_invalid_mode(&self) -> bool {
        matches!(self, DomainError::InvalidMode(_))
    }
}
