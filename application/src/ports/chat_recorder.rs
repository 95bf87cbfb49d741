//! Port for persisting dispatch results.
//!
//! The orchestrator hands every finished [`OrchestrationResult`] to a
//! [`ChatRecorder`] exactly once. Recording is best effort: a failure is
//! logged by the caller and never changes the result.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hotbox_domain::{ChatTurn, OrchestrationResult, SessionId};
use thiserror::Error;

/// Errors raised by a recorder implementation
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Persistence collaborator for chat sessions
#[async_trait]
pub trait ChatRecorder: Send + Sync {
    /// Store one dispatch result for a session
    async fn record(
        &self,
        session: &SessionId,
        result: &OrchestrationResult,
        at: DateTime<Utc>,
    ) -> Result<(), RecordError>;

    /// The last `max_turns` conversation turns recorded for a session,
    /// oldest first
    async fn history(
        &self,
        _session: &SessionId,
        _max_turns: usize,
    ) -> Result<Vec<ChatTurn>, RecordError> {
        Ok(Vec::new())
    }
}

/// No-op recorder for tests and when persistence is disabled.
pub struct NoRecorder;

#[async_trait]
impl ChatRecorder for NoRecorder {
    async fn record(
        &self,
        _session: &SessionId,
        _result: &OrchestrationResult,
        _at: DateTime<Utc>,
    ) -> Result<(), RecordError> {
        Ok(())
    }
}
