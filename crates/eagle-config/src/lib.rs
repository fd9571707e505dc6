//! # eagle-config
//!
//! Layered configuration loading for Eagle using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`EAGLE_*` prefix, `__` as separator)
//! 2. Project-level `.eagle/config.toml`
//! 3. User-level `~/.config/eagle/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `EAGLE_DATABASE__PATH` -> `database.path`,
//! `EAGLE_AUDIT__LOCATION` -> `audit.location`, etc.
//!
//! ```no_run
//! use eagle_config::EagleConfig;
//!
//! let config = EagleConfig::load_with_dotenv().expect("config");
//! if config.database.is_remote() {
//!     println!("remote database: {}", config.database.url);
//! }
//! ```

mod audit;
mod database;
mod error;
mod search;

pub use audit::AuditConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use search::SearchConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EagleConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl EagleConfig {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a provider fails or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.env` from the working directory, then [`Self::load`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a provider fails or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".eagle/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("EAGLE_").split("__"))
    }

    /// Reject values the storage layer cannot use as identifiers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("audit.entity_name", &self.audit.entity_name),
            ("audit.location", &self.audit.location),
            ("search.location", &self.search.location),
        ] {
            if value.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    reason: "must not be empty".into(),
                });
            }
        }
        if !self
            .search
            .location
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::InvalidValue {
                field: "search.location".into(),
                reason: "only ASCII letters, digits and '_' are allowed".into(),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("eagle").join("config.toml"))
    }
}
