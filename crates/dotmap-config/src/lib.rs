//! # dotmap-config
//!
//! Layered configuration loading for dotmap using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`DOTMAP_*` prefix, `__` as separator)
//! 2. Project-level `.dotmap/config.toml`
//! 3. User-level `~/.config/dotmap/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `DOTMAP_SCAN__RESPECT_GITIGNORE` -> `scan.respect_gitignore`,
//! `DOTMAP_STORAGE__DATABASE_PATH` -> `storage.database_path`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use dotmap_config::DotmapConfig;
//!
//! let config = DotmapConfig::load_with_dotenv().expect("config");
//! println!("database: {}", config.storage.database_path);
//! ```

mod error;
mod general;
mod scan;
mod storage;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use scan::ScanConfig;
pub use storage::StorageConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project-local config location, relative to the working directory.
pub const LOCAL_CONFIG_PATH: &str = ".dotmap/config.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DotmapConfig {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl DotmapConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source is malformed or a value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.scan.validate()?;
        Ok(config)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer extra providers.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(LOCAL_CONFIG_PATH);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("DOTMAP_").split("__"))
    }

    /// Path to the user-global config file.
    #[must_use]
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dotmap").join("config.toml"))
    }
}
