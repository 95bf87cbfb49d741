//! Output and store configuration from TOML (`[output]`, `[store]`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Re-export OutputFormat from domain for convenience
pub use hotbox_domain::OutputFormat as FileOutputFormat;

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Output format (uses domain type)
    pub format: Option<FileOutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

/// Chat store location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStoreConfig {
    /// JSONL file; defaults to the platform data dir
    pub path: Option<PathBuf>,
    /// Set to false to keep nothing on disk
    pub enabled: Option<bool>,
}

impl FileStoreConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Configured path, or `$XDG_DATA_HOME/holly-hotbox/chats.jsonl`
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(|| {
            dirs::data_dir().map(|d| d.join("holly-hotbox").join("chats.jsonl"))
        })
    }

    /// Readline history for chat mode, kept next to the chat store
    pub fn readline_history_path(&self) -> Option<PathBuf> {
        let store = self.resolved_path()?;
        Some(store.with_file_name("history.txt"))
    }
}
