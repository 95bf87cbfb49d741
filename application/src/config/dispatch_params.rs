//! Dispatch parameters
//!
//! Runtime knobs for [`DispatchUseCase`](crate::use_cases::dispatch::DispatchUseCase).

use std::time::Duration;

/// Per-call deadline applied to every provider query.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Controls how a dispatch waits on providers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchParams {
    /// Deadline for each individual provider call (arbiter included)
    pub timeout: Duration,
}

impl Default for DispatchParams {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl DispatchParams {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
