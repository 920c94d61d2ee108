//! Store configuration.
//!
//! Defaults match the existing deployment layout; environment variables
//! override them. Blank variables are treated as unset.

use crate::logging::default_log_level;
use crate::store::BackendKind;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_BACKEND: &str = "INVENTORY_BACKEND";
pub const ENV_DB_PATH: &str = "INVENTORY_DB_PATH";
pub const ENV_ITEMS_FILE: &str = "INVENTORY_ITEMS_FILE";
pub const ENV_IMAGE_DIR: &str = "INVENTORY_IMAGE_DIR";
pub const ENV_LOG_LEVEL: &str = "INVENTORY_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "INVENTORY_LOG_DIR";

const DEFAULT_DB_PATH: &str = "db/mercari.sqlite3";
const DEFAULT_ITEMS_FILE: &str = "items.json";
const DEFAULT_IMAGE_DIR: &str = "images";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownBackend(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBackend(value) => write!(
                f,
                "unknown item backend `{value}`; expected normalized|denormalized|file"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Settings needed to open the item and image stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: BackendKind,
    /// SQLite file for the relational backends.
    pub db_path: PathBuf,
    /// JSON document for the file backend.
    pub items_file_path: PathBuf,
    pub image_dir: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Normalized,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            items_file_path: PathBuf::from(DEFAULT_ITEMS_FILE),
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Builds configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let mut config = Self::default();
        if let Some(raw) = value(ENV_BACKEND) {
            config.backend = raw.parse()?;
        }
        if let Some(raw) = value(ENV_DB_PATH) {
            config.db_path = PathBuf::from(raw);
        }
        if let Some(raw) = value(ENV_ITEMS_FILE) {
            config.items_file_path = PathBuf::from(raw);
        }
        if let Some(raw) = value(ENV_IMAGE_DIR) {
            config.image_dir = PathBuf::from(raw);
        }
        if let Some(raw) = value(ENV_LOG_LEVEL) {
            config.log_level = raw;
        }
        config.log_dir = value(ENV_LOG_DIR).map(PathBuf::from);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, ENV_BACKEND, ENV_IMAGE_DIR, ENV_LOG_DIR};
    use crate::store::BackendKind;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.backend, BackendKind::Normalized);
        assert_eq!(config.db_path, PathBuf::from("db/mercari.sqlite3"));
    }

    #[test]
    fn overrides_apply_and_blank_values_are_ignored() {
        let config = StoreConfig::from_lookup(lookup(&[
            (ENV_BACKEND, " File "),
            (ENV_IMAGE_DIR, "/srv/images"),
            (ENV_LOG_DIR, "   "),
        ]))
        .unwrap();

        assert_eq!(config.backend, BackendKind::File);
        assert_eq!(config.image_dir, PathBuf::from("/srv/images"));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = StoreConfig::from_lookup(lookup(&[(ENV_BACKEND, "mongo")])).unwrap_err();
        assert_eq!(err, ConfigError::UnknownBackend("mongo".to_string()));
    }
}
