//! Infrastructure layer for holly-hotbox
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: vendor HTTP adapters, configuration file
//! loading, and the JSONL chat store.

pub mod config;
pub mod providers;
pub mod store;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileOutputConfig, FileOutputFormat,
    FilePresetConfig, FileProviderConfig,
};
pub use providers::{ProviderSettings, build_registry};
pub use store::JsonlChatStore;
