//! Application layer for holly-hotbox
//!
//! This crate contains the dispatch use case, the provider registry, port
//! definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod registry;
pub mod use_cases;

// Re-export commonly used types
pub use config::{AUTO_MODE, ComplexityRouter, DispatchParams, ModeCatalog, ModeChoice};
pub use ports::{
    chat_recorder::{ChatRecorder, NoRecorder, RecordError},
    llm_provider::{LlmProvider, ProviderError},
    progress::{DispatchProgress, NoProgress},
};
pub use registry::ProviderRegistry;
pub use use_cases::compose::PromptComposer;
pub use use_cases::dispatch::{DispatchError, DispatchUseCase};
pub use use_cases::check_providers::{CheckProvidersUseCase, ProviderStatus};
