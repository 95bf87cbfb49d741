//! Progress notification port
//!
//! Defines the interface for reporting progress while a prompt is
//! dispatched.

use hotbox_domain::{ModeKind, OrchestrationResult, Outcome, ProviderId};

/// Callback for progress updates during a dispatch
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait DispatchProgress: Send + Sync {
    /// Called before any provider is queried
    fn on_dispatch_start(&self, mode: ModeKind, total_providers: usize);

    /// Called when a provider call finishes, in completion order
    fn on_provider_complete(&self, outcome: &Outcome);

    /// Called before the arbiter is asked to pick a winner (`best` mode)
    fn on_arbiter_start(&self, _arbiter: &ProviderId) {}

    /// Called once the result is ready
    fn on_dispatch_complete(&self, _result: &OrchestrationResult) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl DispatchProgress for NoProgress {
    fn on_dispatch_start(&self, _mode: ModeKind, _total_providers: usize) {}
    fn on_provider_complete(&self, _outcome: &Outcome) {}
}
