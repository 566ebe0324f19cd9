//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! an optional TOML file merged with `DOCHUB__`-prefixed environment
//! variables. Each sub-module represents a logical configuration section.

pub mod classification;
pub mod database;
pub mod logging;
pub mod storage;
pub mod tree;

use serde::{Deserialize, Serialize};

pub use self::classification::ClassificationConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::storage::StorageConfig;
pub use self::tree::TreeConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Uploaded file storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Folder tree limits.
    #[serde(default)]
    pub tree: TreeConfig,
    /// Classification rule limits.
    #[serde(default)]
    pub classification: ClassificationConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// The file is optional; environment variables prefixed with `DOCHUB`
    /// and separated by `__` override it (`DOCHUB__DATABASE__URL`).
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("DOCHUB")
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = AppConfig::load("does/not/exist").expect("defaults");
        assert_eq!(config.tree.max_name_length, 255);
        assert_eq!(config.tree.max_depth, 256);
        assert_eq!(config.logging.level, "info");
        assert!(config.database.run_migrations);
    }
}
