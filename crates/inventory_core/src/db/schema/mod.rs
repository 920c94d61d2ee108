//! Table layouts for the relational backends.
//!
//! # Responsibility
//! - Map each layout to its `CREATE TABLE IF NOT EXISTS` script.
//! - Apply the script atomically and record the schema version.
//!
//! # Invariants
//! - Applying a layout twice is a no-op.
//! - A database stamped with a newer version than `SCHEMA_VERSION` is refused.
//! - A database whose `items` table belongs to the other layout is refused
//!   and left exactly as it was found.

use crate::db::{DbError, DbResult};
use rusqlite::{Connection, TransactionBehavior};
use std::fmt::{Display, Formatter};

/// Schema version stamped into `PRAGMA user_version`.
pub const SCHEMA_VERSION: u32 = 1;

/// Relational table layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaLayout {
    /// `items(id, name, category_id, image_name)` + `categories(id, name)`.
    Normalized,
    /// `items(id, name, category, image_name)`.
    Denormalized,
}

impl SchemaLayout {
    fn sql(self) -> &'static str {
        match self {
            Self::Normalized => include_str!("normalized.sql"),
            Self::Denormalized => include_str!("denormalized.sql"),
        }
    }

    /// Columns the `items` table must carry for this layout.
    fn item_columns(self) -> &'static [&'static str] {
        match self {
            Self::Normalized => &["id", "name", "category_id", "image_name"],
            Self::Denormalized => &["id", "name", "category", "image_name"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normalized => "normalized",
            Self::Denormalized => "denormalized",
        }
    }
}

impl Display for SchemaLayout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creates any missing tables for `layout` on the provided connection.
pub fn apply_schema(conn: &mut Connection, layout: SchemaLayout) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    if current_version > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: SCHEMA_VERSION,
        });
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute_batch(layout.sql())?;
    // Dropping `tx` on a mismatch rolls back any table the script created.
    ensure_item_columns(&tx, layout)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;

    Ok(())
}

fn ensure_item_columns(conn: &Connection, layout: SchemaLayout) -> DbResult<()> {
    let mut stmt = conn.prepare("PRAGMA table_info(items);")?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    match layout
        .item_columns()
        .iter()
        .find(|column| !present.iter().any(|name| name == *column))
    {
        Some(&column) => Err(DbError::LayoutMismatch { layout, column }),
        None => Ok(()),
    }
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
