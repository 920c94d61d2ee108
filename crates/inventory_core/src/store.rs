//! Backend selection and startup.
//!
//! # Responsibility
//! - Name the three item backends and parse them from configuration.
//! - Open the selected backend and report startup failures as values.
//!
//! # Invariants
//! - Callers receive the backend only as `dyn ItemRepository`.
//! - Startup never panics or exits the process; `InitError` is returned to
//!   the composing layer, which decides how to react.

use crate::config::{ConfigError, StoreConfig};
use crate::db::{open_db, DbError, SchemaLayout};
use crate::images::store::ImageError;
use crate::repo::file_repo::JsonFileItemRepository;
use crate::repo::item_repo::{ItemRepository, RepoError, RepoResult};
use crate::repo::sqlite_repo::{SqliteDenormalizedItemRepository, SqliteNormalizedItemRepository};
use log::{error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Item storage backend, chosen by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Normalized,
    Denormalized,
    File,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normalized => "normalized",
            Self::Denormalized => "denormalized",
            Self::File => "file",
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "normalized" => Ok(Self::Normalized),
            "denormalized" => Ok(Self::Denormalized),
            "file" | "json" => Ok(Self::File),
            _ => Err(ConfigError::UnknownBackend(value.to_string())),
        }
    }
}

/// Startup failure of a store.
#[derive(Debug)]
pub enum InitError {
    Config(ConfigError),
    Db(DbError),
    Repo(RepoError),
    Image(ImageError),
    Logging(String),
}

impl Display for InitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::Db(err) => write!(f, "failed to open database: {err}"),
            Self::Repo(err) => write!(f, "failed to open item store: {err}"),
            Self::Image(err) => write!(f, "failed to open image store: {err}"),
            Self::Logging(message) => write!(f, "failed to initialize logging: {message}"),
        }
    }
}

impl Error for InitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Image(err) => Some(err),
            Self::Logging(_) => None,
        }
    }
}

impl From<ConfigError> for InitError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for InitError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for InitError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ImageError> for InitError {
    fn from(value: ImageError) -> Self {
        Self::Image(value)
    }
}

/// An opened item backend.
pub enum ItemBackend {
    Normalized(Connection),
    Denormalized(Connection),
    File(JsonFileItemRepository),
}

impl ItemBackend {
    /// Opens the backend selected by `config.backend`.
    ///
    /// Relational backends create their tables; every backend is checked for
    /// readiness before it is returned.
    pub fn open(config: &StoreConfig) -> Result<Self, InitError> {
        info!(
            "event=backend_open module=store status=start backend={}",
            config.backend
        );

        let result = Self::open_inner(config);
        match &result {
            Ok(_) => info!(
                "event=backend_open module=store status=ok backend={}",
                config.backend
            ),
            Err(err) => error!(
                "event=backend_open module=store status=error backend={} error={}",
                config.backend, err
            ),
        }
        result
    }

    fn open_inner(config: &StoreConfig) -> Result<Self, InitError> {
        let backend = match config.backend {
            BackendKind::Normalized => {
                Self::Normalized(open_db(&config.db_path, SchemaLayout::Normalized)?)
            }
            BackendKind::Denormalized => {
                Self::Denormalized(open_db(&config.db_path, SchemaLayout::Denormalized)?)
            }
            BackendKind::File => {
                Self::File(JsonFileItemRepository::open(&config.items_file_path)?)
            }
        };
        backend.repository()?;
        Ok(backend)
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Normalized(_) => BackendKind::Normalized,
            Self::Denormalized(_) => BackendKind::Denormalized,
            Self::File(_) => BackendKind::File,
        }
    }

    /// Borrows the backend through the item repository contract.
    pub fn repository(&self) -> RepoResult<Box<dyn ItemRepository + '_>> {
        let repo: Box<dyn ItemRepository + '_> = match self {
            Self::Normalized(conn) => Box::new(SqliteNormalizedItemRepository::try_new(conn)?),
            Self::Denormalized(conn) => Box::new(SqliteDenormalizedItemRepository::try_new(conn)?),
            Self::File(repo) => Box::new(repo),
        };
        Ok(repo)
    }
}

#[cfg(test)]
mod tests {
    use super::BackendKind;
    use crate::config::ConfigError;

    #[test]
    fn backend_kind_parses_case_insensitively() {
        assert_eq!("Normalized".parse::<BackendKind>(), Ok(BackendKind::Normalized));
        assert_eq!(" denormalized ".parse::<BackendKind>(), Ok(BackendKind::Denormalized));
        assert_eq!("FILE".parse::<BackendKind>(), Ok(BackendKind::File));
        assert_eq!("json".parse::<BackendKind>(), Ok(BackendKind::File));
        assert_eq!(
            "redis".parse::<BackendKind>(),
            Err(ConfigError::UnknownBackend("redis".to_string()))
        );
    }

    #[test]
    fn backend_kind_display_round_trips() {
        for kind in [BackendKind::Normalized, BackendKind::Denormalized, BackendKind::File] {
            assert_eq!(kind.to_string().parse::<BackendKind>(), Ok(kind));
        }
    }
}
