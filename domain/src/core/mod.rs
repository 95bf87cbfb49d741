//! Core domain concepts shared across all subdomains.
//!
//! - [`provider::ProviderId`] — the LLM vendors a prompt can be sent to
//! - [`prompt::Prompt`] — a validated user prompt bound to a mode and session
//! - [`session::SessionId`] — identifies the chat session a prompt belongs to
//! - [`error::DomainError`] — domain-level errors

pub mod error;
pub mod prompt;
pub mod provider;
pub mod session;
