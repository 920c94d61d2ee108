//! Use-case services composing the item and image stores.
//!
//! # Invariants
//! - Services never bypass repository validation or image path checks.
//! - Services stay storage-agnostic; backends are injected.

pub mod inventory_service;
