//! SQLite-backed item repositories.
//!
//! # Responsibility
//! - Normalized layout: items reference `categories` by id; reads join back
//!   to the category name.
//! - Denormalized layout: category text is stored inline on every row.
//!
//! # Invariants
//! - Normalized inserts run in one `IMMEDIATE` transaction covering category
//!   lookup-or-create and the item row; any failure rolls both back.
//! - Reads are ordered by ascending item id (insertion order).
//! - Category names are never reconciled across rows in the denormalized
//!   layout; `Shoes` and `shoes` stay distinct.

use crate::model::item::{Item, ItemId, NewItem};
use crate::repo::category_resolver::resolve_category_id;
use crate::repo::item_repo::{resolve_requested_id, ItemRepository, RepoError, RepoResult};
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const NORMALIZED_SELECT_SQL: &str = "SELECT
    items.id,
    items.name,
    categories.name,
    items.image_name
FROM items
INNER JOIN categories ON items.category_id = categories.id";

const DENORMALIZED_SELECT_SQL: &str = "SELECT
    id,
    name,
    category,
    image_name
FROM items";

const NORMALIZED_REQUIRED: &[(&str, &[&str])] = &[
    ("categories", &["id", "name"]),
    ("items", &["id", "name", "category_id", "image_name"]),
];

const DENORMALIZED_REQUIRED: &[(&str, &[&str])] =
    &[("items", &["id", "name", "category", "image_name"])];

/// Item repository over the normalized `items` + `categories` layout.
pub struct SqliteNormalizedItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNormalizedItemRepository<'conn> {
    /// Creates repository from a connection opened with
    /// `SchemaLayout::Normalized`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, NORMALIZED_REQUIRED)?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteNormalizedItemRepository<'_> {
    fn insert_item(&self, item: &NewItem) -> RepoResult<ItemId> {
        item.validate()?;

        let result = insert_normalized(self.conn, item);
        log_insert("normalized", &result);
        result
    }

    fn get_all_items(&self) -> RepoResult<Vec<Item>> {
        query_all(self.conn, NORMALIZED_SELECT_SQL, "items.id")
    }

    fn get_item_by_id(&self, id: &str) -> RepoResult<Item> {
        let id = resolve_requested_id(id)?;
        query_one(self.conn, NORMALIZED_SELECT_SQL, "items.id", id)
    }
}

fn insert_normalized(conn: &Connection, item: &NewItem) -> RepoResult<ItemId> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let category_id = resolve_category_id(&tx, &item.category)?;
    tx.execute(
        "INSERT INTO items (name, category_id, image_name) VALUES (?1, ?2, ?3);",
        params![item.name, category_id, item.image],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    Ok(id)
}

/// Item repository over the single-table denormalized layout.
pub struct SqliteDenormalizedItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDenormalizedItemRepository<'conn> {
    /// Creates repository from a connection opened with
    /// `SchemaLayout::Denormalized`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, DENORMALIZED_REQUIRED)?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteDenormalizedItemRepository<'_> {
    fn insert_item(&self, item: &NewItem) -> RepoResult<ItemId> {
        item.validate()?;

        let result = self
            .conn
            .execute(
                "INSERT INTO items (name, category, image_name) VALUES (?1, ?2, ?3);",
                params![item.name, item.category, item.image],
            )
            .map(|_| self.conn.last_insert_rowid())
            .map_err(RepoError::from);
        log_insert("denormalized", &result);
        result
    }

    fn get_all_items(&self) -> RepoResult<Vec<Item>> {
        query_all(self.conn, DENORMALIZED_SELECT_SQL, "id")
    }

    fn get_item_by_id(&self, id: &str) -> RepoResult<Item> {
        let id = resolve_requested_id(id)?;
        query_one(self.conn, DENORMALIZED_SELECT_SQL, "id", id)
    }
}

fn query_all(conn: &Connection, select_sql: &str, id_column: &str) -> RepoResult<Vec<Item>> {
    let mut stmt = conn.prepare(&format!("{select_sql} ORDER BY {id_column} ASC;"))?;
    let mut rows = stmt.query([])?;
    let mut items = Vec::new();

    while let Some(row) = rows.next()? {
        items.push(parse_item_row(row)?);
    }

    Ok(items)
}

fn query_one(
    conn: &Connection,
    select_sql: &str,
    id_column: &str,
    id: ItemId,
) -> RepoResult<Item> {
    let mut stmt = conn.prepare(&format!("{select_sql} WHERE {id_column} = ?1;"))?;
    let item = stmt
        .query_row(params![id], |row| Ok(parse_item_row(row)))
        .optional()?;

    match item {
        Some(item) => item,
        None => Err(RepoError::NotFound(id)),
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let item = Item {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        image: row.get(3)?,
    };

    if item.name.is_empty() || item.category.is_empty() || item.image.is_empty() {
        return Err(RepoError::InvalidData(format!(
            "item {} has an empty required field",
            item.id
        )));
    }
    Ok(item)
}

fn log_insert(backend: &str, result: &RepoResult<ItemId>) {
    match result {
        Ok(id) => info!(
            "event=item_insert module=repo status=ok backend={} item_id={}",
            backend, id
        ),
        Err(err) => warn!(
            "event=item_insert module=repo status=error backend={} error_kind={} error={}",
            backend,
            err.kind(),
            err
        ),
    }
}

fn ensure_connection_ready(
    conn: &Connection,
    required: &[(&'static str, &[&'static str])],
) -> RepoResult<()> {
    for &(table, columns) in required {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
