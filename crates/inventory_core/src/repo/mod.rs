//! Item repository contract and its storage backends.
//!
//! # Responsibility
//! - Define the storage-agnostic item contract (`ItemRepository`).
//! - Keep SQL and document details inside the persistence boundary.
//!
//! # Invariants
//! - Every write path calls `NewItem::validate()` before touching storage.
//! - A failed insert leaves the store exactly as it was.
//! - Repositories return semantic errors (`NotFound`, `Validation`) in
//!   addition to storage errors.

pub mod category_resolver;
pub mod file_repo;
pub mod item_repo;
pub mod sqlite_repo;
