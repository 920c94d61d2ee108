//! Item domain model.
//!
//! # Responsibility
//! - Define the write model (`NewItem`) and the read model (`Item`).
//! - Parse caller-supplied identifiers.
//!
//! # Invariants
//! - `name`, `category` and `image` are non-empty for every stored item.
//! - Identifiers are positive integers assigned by the backend.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::IntErrorKind;

/// Backend-assigned item identifier. Always `>= 1` for stored items.
pub type ItemId = i64;

/// Validation failures for item input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    EmptyName,
    EmptyCategory,
    EmptyImage,
    /// The raw identifier text is not an integer.
    MalformedId(String),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name is required"),
            Self::EmptyCategory => write!(f, "category is required"),
            Self::EmptyImage => write!(f, "image is required"),
            Self::MalformedId(raw) => write!(f, "item id `{raw}` is not an integer"),
        }
    }
}

impl Error for ItemValidationError {}

/// Input for a new item. The image is a reference returned by the image store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub image: String,
}

impl NewItem {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            image: image.into(),
        }
    }

    /// Rejects empty fields. Whitespace is content and is kept as-is.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.name.is_empty() {
            return Err(ItemValidationError::EmptyName);
        }
        if self.category.is_empty() {
            return Err(ItemValidationError::EmptyCategory);
        }
        if self.image.is_empty() {
            return Err(ItemValidationError::EmptyImage);
        }
        Ok(())
    }

    /// Attaches a backend-assigned identifier.
    pub fn into_item(self, id: ItemId) -> Item {
        Item {
            id,
            name: self.name,
            category: self.category,
            image: self.image,
        }
    }
}

/// Stored item as seen by readers.
///
/// Serialized as `{ "id", "name", "category", "image" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    /// Image file name inside the image store (`<sha256-hex>.jpg`).
    pub image: String,
}

/// Parses a caller-supplied identifier.
///
/// Only integer syntax is checked here. Non-positive values parse fine and
/// are reported as not found by the repositories. Integers outside the
/// `ItemId` range clamp to its bounds, so they are never found either.
pub fn parse_item_id(raw: &str) -> Result<ItemId, ItemValidationError> {
    raw.parse::<ItemId>().or_else(|err| match err.kind() {
        IntErrorKind::PosOverflow => Ok(ItemId::MAX),
        IntErrorKind::NegOverflow => Ok(ItemId::MIN),
        _ => Err(ItemValidationError::MalformedId(raw.to_string())),
    })
}
