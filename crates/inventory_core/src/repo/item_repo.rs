//! Item repository contract shared by every backend.
//!
//! # Responsibility
//! - Declare insert / list / get-by-id with identical semantics across
//!   backends.
//! - Provide the repository error type and id resolution helper.
//!
//! # Invariants
//! - `get_all_items` returns items in insertion order and never fails just
//!   because the store is empty.
//! - `get_item_by_id` rejects non-integer ids with `Validation` and unknown or
//!   non-positive ids with `NotFound`.

use crate::db::DbError;
use crate::error::ErrorKind;
use crate::model::item::{parse_item_id, Item, ItemId, ItemValidationError, NewItem};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ItemValidationError),
    NotFound(ItemId),
    Db(DbError),
    /// File-backed store I/O failure.
    Io(std::io::Error),
    /// File-backed store document could not be (de)serialized.
    Document(serde_json::Error),
    /// Connection schema lacks a table this repository needs.
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Db(_)
            | Self::Io(_)
            | Self::Document(_)
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => ErrorKind::Storage,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "items file error: {err}"),
            Self::Document(err) => write!(f, "items document error: {err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "item repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "item repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Document(err) => Some(err),
            Self::NotFound(_)
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for RepoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Document(value)
    }
}

/// Repository interface for item operations.
///
/// Implementations are interchangeable; callers pick one at construction time
/// and depend only on this trait.
pub trait ItemRepository {
    /// Validates and stores one item, returning its assigned id.
    fn insert_item(&self, item: &NewItem) -> RepoResult<ItemId>;
    /// Returns every stored item in insertion order.
    fn get_all_items(&self) -> RepoResult<Vec<Item>>;
    /// Loads one item by caller-supplied id text.
    fn get_item_by_id(&self, id: &str) -> RepoResult<Item>;
}

impl<T: ItemRepository + ?Sized> ItemRepository for &T {
    fn insert_item(&self, item: &NewItem) -> RepoResult<ItemId> {
        (**self).insert_item(item)
    }

    fn get_all_items(&self) -> RepoResult<Vec<Item>> {
        (**self).get_all_items()
    }

    fn get_item_by_id(&self, id: &str) -> RepoResult<Item> {
        (**self).get_item_by_id(id)
    }
}

impl<T: ItemRepository + ?Sized> ItemRepository for Box<T> {
    fn insert_item(&self, item: &NewItem) -> RepoResult<ItemId> {
        (**self).insert_item(item)
    }

    fn get_all_items(&self) -> RepoResult<Vec<Item>> {
        (**self).get_all_items()
    }

    fn get_item_by_id(&self, id: &str) -> RepoResult<Item> {
        (**self).get_item_by_id(id)
    }
}

/// Parses id text and rejects ids that can never exist.
pub(crate) fn resolve_requested_id(raw: &str) -> RepoResult<ItemId> {
    let id = parse_item_id(raw)?;
    if id < 1 {
        return Err(RepoError::NotFound(id));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::{resolve_requested_id, RepoError};
    use crate::error::ErrorKind;

    #[test]
    fn resolve_requested_id_classifies_bad_input() {
        assert_eq!(resolve_requested_id("7").unwrap(), 7);
        assert!(matches!(resolve_requested_id("0"), Err(RepoError::NotFound(0))));
        assert!(matches!(resolve_requested_id("-1"), Err(RepoError::NotFound(-1))));

        let err = resolve_requested_id("abc").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
