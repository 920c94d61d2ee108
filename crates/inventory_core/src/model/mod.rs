//! Domain model for inventory items.
//!
//! # Responsibility
//! - Define the item record shared by every storage backend.
//! - Own input validation so no backend accepts empty fields.
//!
//! # Invariants
//! - An item is never observable without all four fields populated.
//! - Items are immutable once written; there is no update or delete.

pub mod item;
