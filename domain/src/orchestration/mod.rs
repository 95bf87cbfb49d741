//! Orchestration domain
//!
//! Value objects describing how a prompt fans out to providers and what
//! comes back:
//! - [`mode::Mode`] — the selection policy requested for a prompt
//! - [`outcome::Outcome`] — one provider's answer or typed failure
//! - [`result::OrchestrationResult`] — everything a dispatch produced
//! - [`complexity::ComplexityReport`] — heuristic score used for `auto` routing

pub mod complexity;
pub mod mode;
pub mod outcome;
pub mod result;
