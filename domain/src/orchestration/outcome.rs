//! Per-provider outcomes.
//!
//! Every adapter invocation produces exactly one [`Outcome`]: either a
//! [`Outcome::Success`] carrying the provider's text or a
//! [`Outcome::Failure`] carrying an [`ErrorKind`]. Failures are values here,
//! never errors raised out of a dispatch.

use crate::core::provider::ProviderId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Why a single provider call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No answer within the per-call timeout
    Timeout,
    /// Missing or rejected credential
    Authentication,
    /// Vendor throttled the request
    RateLimit,
    /// Vendor answered with a payload that could not be understood
    MalformedResponse,
    /// The provider is not registered
    UnknownProvider,
    /// Connection failure or vendor-side server error
    Transport,
    /// The adapter task itself crashed
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::Authentication => "authentication",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::UnknownProvider => "unknown_provider",
            ErrorKind::Transport => "transport",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw answer from a provider before it is timed and attributed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Completion {
    pub text: String,
    /// Vendor model that produced the text (e.g. "gpt-4o")
    pub model: Option<String>,
    /// Total tokens billed for the call, when the vendor reports it
    pub tokens: Option<u32>,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
            tokens: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_tokens(mut self, tokens: u32) -> Self {
        self.tokens = Some(tokens);
        self
    }
}

/// Result of one adapter invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success {
        provider: ProviderId,
        text: String,
        #[serde(rename = "latency_ms", with = "duration_ms")]
        latency: Duration,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tokens: Option<u32>,
    },
    Failure {
        provider: ProviderId,
        error: ErrorKind,
        message: String,
        #[serde(rename = "latency_ms", with = "duration_ms")]
        latency: Duration,
    },
}

impl Outcome {
    /// Attribute a completion to the provider that produced it
    pub fn success(provider: ProviderId, completion: Completion, latency: Duration) -> Self {
        Outcome::Success {
            provider,
            text: completion.text,
            latency,
            model: completion.model,
            tokens: completion.tokens,
        }
    }

    pub fn failure(
        provider: ProviderId,
        error: ErrorKind,
        message: impl Into<String>,
        latency: Duration,
    ) -> Self {
        Outcome::Failure {
            provider,
            error,
            message: message.into(),
            latency,
        }
    }

    pub fn provider(&self) -> &ProviderId {
        match self {
            Outcome::Success { provider, .. } | Outcome::Failure { provider, .. } => provider,
        }
    }

    /// Wall-clock time from dispatch to completion (or failure)
    pub fn latency(&self) -> Duration {
        match self {
            Outcome::Success { latency, .. } | Outcome::Failure { latency, .. } => *latency,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// The answer text, for successes
    pub fn text(&self) -> Option<&str> {
        match self {
            Outcome::Success { text, .. } => Some(text),
            Outcome::Failure { .. } => None,
        }
    }

    /// The failure kind, for failures
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure { error, .. } => Some(*error),
        }
    }

    pub fn tokens(&self) -> Option<u32> {
        match self {
            Outcome::Success { tokens, .. } => *tokens,
            Outcome::Failure { .. } => None,
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_accessors() {
        let outcome = Outcome::success(
            ProviderId::Claude,
            Completion::new("Hi there").with_model("claude-sonnet-4").with_tokens(12),
            Duration::from_millis(420),
        );
        assert!(outcome.is_success());
        assert_eq!(outcome.provider(), &ProviderId::Claude);
        assert_eq!(outcome.text(), Some("Hi there"));
        assert_eq!(outcome.tokens(), Some(12));
        assert_eq!(outcome.error_kind(), None);
    }

    #[test]
    fn test_failure_accessors() {
        let outcome = Outcome::failure(
            ProviderId::Grok,
            ErrorKind::RateLimit,
            "HTTP 429",
            Duration::from_millis(80),
        );
        assert!(!outcome.is_success());
        assert_eq!(outcome.text(), None);
        assert_eq!(outcome.error_kind(), Some(ErrorKind::RateLimit));
        assert_eq!(outcome.latency(), Duration::from_millis(80));
    }

    #[test]
    fn test_serialized_shape() {
        let outcome = Outcome::failure(
            ProviderId::DeepSeek,
            ErrorKind::Timeout,
            "no answer after 30s",
            Duration::from_secs(30),
        );
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "failure");
        assert_eq!(value["provider"], "deepseek");
        assert_eq!(value["error"], "timeout");
        assert_eq!(value["latency_ms"], 30_000);

        let back: Outcome = serde_json::from_value(value).unwrap();
        assert_eq!(back, outcome);
    }

    #[test]
    fn test_success_omits_missing_usage() {
        let outcome = Outcome::success(
            ProviderId::HuggingFace,
            Completion::new("ok"),
            Duration::from_millis(5),
        );
        let value = serde_json::to_value(&outcome).unwrap();
        assert!(value.get("tokens").is_none());
        assert!(value.get("model").is_none());
    }
}
