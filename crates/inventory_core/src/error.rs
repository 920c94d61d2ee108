//! Error classification shared by every store.
//!
//! Each module keeps its own error enum; `ErrorKind` is the common
//! vocabulary callers use to decide how to react (reject input, report a
//! missing record, refuse a suspicious path, or surface a fault).

use std::fmt::{Display, Formatter};

/// Caller-facing class of a core error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed caller input. Never retried.
    Validation,
    /// Requested record or file does not exist.
    NotFound,
    /// Image path failed traversal or suffix checks.
    InvalidReference,
    /// I/O, transaction or serialization failure.
    Storage,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::InvalidReference => "invalid_reference",
            Self::Storage => "storage",
        };
        f.write_str(label)
    }
}
