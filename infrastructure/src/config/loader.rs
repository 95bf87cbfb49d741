//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "holly-hotbox";
const PROJECT_FILES: [&str; 2] = ["hotbox.toml", ".hotbox.toml"];
const ENV_PREFIX: &str = "HOTBOX_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. Project root: `./hotbox.toml` or `./.hotbox.toml`
    /// 3. XDG config: `$XDG_CONFIG_HOME/holly-hotbox/config.toml`
    /// 4. `HOTBOX_` environment variables (`HOTBOX_ORCHESTRATOR__TIMEOUT_SECONDS=60`)
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path, Self::global_config_path().as_deref())
            .extract()
            .map_err(Box::new)
    }

    fn figment(config_path: Option<&PathBuf>, global_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(global_path) = global_path
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(path));
        }

        // Explicit path wins over everything else
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/holly-hotbox/config.toml if set,
    /// otherwise the platform config dir equivalent
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(explicit: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");

        if let Some(path) = explicit {
            let found = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<7}] Explicit: {}", found, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND  ] Project:  {}", path.display());
        } else {
            println!("  [       ] Project:  ./hotbox.toml or ./.hotbox.toml");
        }

        if let Some(path) = Self::global_config_path() {
            let found = if path.exists() { "FOUND" } else { "" };
            println!("  [{:<7}] Global:   {}", found, path.display());
        }

        let env_vars = std::env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .count();
        if env_vars > 0 {
            println!("  [FOUND  ] Env:      {} {}* variable(s)", env_vars, ENV_PREFIX);
        } else {
            println!("  [       ] Env:      {}*", ENV_PREFIX);
        }

        println!("  [       ] Default:  built-in defaults");
    }
}
