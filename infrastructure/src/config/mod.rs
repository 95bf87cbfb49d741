//! Configuration file loading for holly-hotbox
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./hotbox.toml` or `./.hotbox.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/holly-hotbox/config.toml`
//! 4. `HOTBOX_*` environment variables
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileIdentityConfig, FileOrchestratorConfig,
    FileOutputConfig, FileOutputFormat, FilePresetConfig, FileProviderConfig,
    FileProvidersConfig, FileRoutingConfig, FileStoreConfig,
};
pub use loader::ConfigLoader;
