//! Domain layer for holly-hotbox
//!
//! This crate contains the value objects of multi-provider orchestration.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Prompt**: the user's text, the requested [`Mode`], and its session
//! - **Mode**: how a prompt fans out (`single`, `fastest`, `consensus`,
//!   `best`, `parallel`)
//! - **Outcome**: one provider's answer or typed failure; failures are
//!   values, never errors
//! - **OrchestrationResult**: the outcomes of one dispatch plus, where the
//!   policy picks one, the selected answer

pub mod config;
pub mod core;
pub mod orchestration;
pub mod prompt;
pub mod session;
pub mod util;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{error::DomainError, prompt::Prompt, provider::ProviderId, session::SessionId};
pub use orchestration::{
    complexity::{Complexity, ComplexityReport},
    mode::{Mode, ModeKind},
    outcome::{Completion, ErrorKind, Outcome},
    result::OrchestrationResult,
};
pub use prompt::PromptTemplate;
pub use session::entities::{ChatTurn, Role};
