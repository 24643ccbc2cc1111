//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field has a default so an empty file is valid.

pub mod cache;
pub mod index;
pub mod logging;
pub mod render;
pub mod storage;

use serde::{Deserialize, Serialize};

use self::cache::CacheConfig;
use self::index::{IndexConfig, RevisionConfig};
use self::logging::LoggingConfig;
use self::render::RenderConfig;
use self::storage::StorageConfig;

use crate::error::AppError;

/// Environment variable prefix for overrides, e.g. `TROVE__INDEX__LOCK_TIMEOUT_MS`.
const ENV_PREFIX: &str = "TROVE";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// File index settings.
    #[serde(default)]
    pub index: IndexConfig,
    /// Revision history listing settings.
    #[serde(default)]
    pub revisions: RevisionConfig,
    /// Render cache settings.
    #[serde(default)]
    pub render: RenderConfig,
    /// Storage location settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Cache provider settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for an environment.
    ///
    /// Merges `config/default`, the `config/{env}` overlay and environment
    /// variables prefixed with `TROVE__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::build(
            config::Config::builder()
                .add_source(config::File::with_name("config/default").required(false))
                .add_source(config::File::with_name(&format!("config/{env}")).required(false)),
        )
    }

    /// Load configuration from one explicit file plus environment overrides.
    pub fn load_from(path: &str) -> Result<Self, AppError> {
        Self::build(
            config::Config::builder().add_source(config::File::with_name(path).required(false)),
        )
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, AppError> {
        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
