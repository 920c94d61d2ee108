//! Content-addressed image storage.
//!
//! # Responsibility
//! - Store photo bytes once per distinct content under a hash-derived name.
//! - Resolve requested file names to safe paths inside the image root.
//!
//! # Invariants
//! - Identical bytes always map to the same `<sha256-hex>.jpg` name.
//! - Stored blobs are never rewritten or deleted.
//! - Every resolution is checked against directory traversal and suffix
//!   rules, independent of how the name was produced.

pub mod store;
