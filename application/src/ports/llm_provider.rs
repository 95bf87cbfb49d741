//! LLM Provider port
//!
//! Defines the interface every vendor adapter implements. Adapters live in
//! the infrastructure layer; the orchestrator only sees [`LlmProvider`].

use async_trait::async_trait;
use hotbox_domain::{Completion, ErrorKind, Outcome, ProviderId};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Errors an adapter can report for a single call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Missing credential: set {0}")]
    MissingCredential(String),

    #[error("Authentication rejected: {0}")]
    Unauthorized(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),
}

impl ProviderError {
    /// Map onto the per-call failure taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::MissingCredential(_) | ProviderError::Unauthorized(_) => {
                ErrorKind::Authentication
            }
            ProviderError::RateLimited(_) => ErrorKind::RateLimit,
            ProviderError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            ProviderError::Timeout => ErrorKind::Timeout,
            ProviderError::Transport(_) => ErrorKind::Transport,
        }
    }
}

/// A single LLM vendor
///
/// Implementations own their credential and endpoint configuration and keep
/// no state between calls.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Identifier this adapter is registered under
    fn id(&self) -> &ProviderId;

    /// Whether a credential is configured (used by provider checks)
    fn has_credential(&self) -> bool {
        true
    }

    /// Send the prompt text and return the vendor's answer
    async fn complete(&self, prompt: &str) -> Result<Completion, ProviderError>;

    /// Send with a deadline and normalize the result into an [`Outcome`].
    ///
    /// Never fails: errors and deadline expiry become `Outcome::Failure`.
    async fn send(&self, prompt: &str, timeout: Duration) -> Outcome {
        let started = Instant::now();
        let result = tokio::time::timeout(timeout, self.complete(prompt)).await;
        let latency = started.elapsed();

        match result {
            Ok(Ok(completion)) => Outcome::success(self.id().clone(), completion, latency),
            Ok(Err(e)) => Outcome::failure(self.id().clone(), e.kind(), e.to_string(), latency),
            Err(_) => Outcome::failure(
                self.id().clone(),
                ErrorKind::Timeout,
                format!("no answer within {}ms", timeout.as_millis()),
                latency,
            ),
        }
    }
}
