//! Category name to id resolution for the normalized layout.
//!
//! # Invariants
//! - Category names are case-sensitive and unique (`categories.name UNIQUE`).
//! - Resolution runs inside the caller's write transaction, so two concurrent
//!   inserts of a new name cannot both create a row.

use crate::repo::item_repo::RepoResult;
use log::debug;
use rusqlite::{params, OptionalExtension, Transaction};

/// Row id in `categories`.
pub type CategoryId = i64;

/// Looks up `name`, creating the category row when it does not exist yet.
pub fn resolve_category_id(tx: &Transaction<'_>, name: &str) -> RepoResult<CategoryId> {
    if let Some(id) = find_category_id(tx, name)? {
        return Ok(id);
    }

    tx.execute("INSERT INTO categories (name) VALUES (?1);", params![name])?;
    let id = tx.last_insert_rowid();
    debug!("event=category_create module=repo status=ok category_id={id}");
    Ok(id)
}

fn find_category_id(tx: &Transaction<'_>, name: &str) -> RepoResult<Option<CategoryId>> {
    let id = tx
        .query_row(
            "SELECT id FROM categories WHERE name = ?1;",
            params![name],
            |row| row.get::<_, CategoryId>(0),
        )
        .optional()?;
    Ok(id)
}
