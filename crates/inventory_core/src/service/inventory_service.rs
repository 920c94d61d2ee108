//! Inventory use-case service.
//!
//! # Responsibility
//! - Create items by storing the photo first, then inserting the record.
//! - Delegate listing and lookup to the injected item repository.
//! - Serve image paths with default-asset fallback for missing files.

use crate::error::ErrorKind;
use crate::images::store::{ImageError, ImageStore};
use crate::model::item::{Item, ItemId, ItemValidationError, NewItem};
use crate::repo::item_repo::{ItemRepository, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    Image(ImageError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Repo(err) => err.kind(),
            Self::Image(err) => err.kind(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Image(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Image(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ImageError> for ServiceError {
    fn from(value: ImageError) -> Self {
        Self::Image(value)
    }
}

impl From<ItemValidationError> for ServiceError {
    fn from(value: ItemValidationError) -> Self {
        Self::Repo(RepoError::Validation(value))
    }
}

/// Use-case service over one item repository and one image store.
pub struct InventoryService<R: ItemRepository> {
    repo: R,
    images: ImageStore,
}

impl<R: ItemRepository> InventoryService<R> {
    pub fn new(repo: R, images: ImageStore) -> Self {
        Self { repo, images }
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Stores `image` and inserts the item referencing it.
    ///
    /// Name and category are checked before the photo is written, so invalid
    /// input leaves no blob behind. A blob written for an insert that later
    /// fails is kept; it is content-addressed and reused on retry.
    pub fn add_item(&self, name: &str, category: &str, image: &[u8]) -> ServiceResult<ItemId> {
        if name.is_empty() {
            return Err(ItemValidationError::EmptyName.into());
        }
        if category.is_empty() {
            return Err(ItemValidationError::EmptyCategory.into());
        }
        if image.is_empty() {
            return Err(ItemValidationError::EmptyImage.into());
        }

        let image_name = self.images.put(image)?;
        info!("event=item_received module=service status=ok image={image_name}");

        let id = self
            .repo
            .insert_item(&NewItem::new(name, category, image_name))?;
        Ok(id)
    }

    pub fn list_items(&self) -> ServiceResult<Vec<Item>> {
        Ok(self.repo.get_all_items()?)
    }

    pub fn get_item(&self, id: &str) -> ServiceResult<Item> {
        Ok(self.repo.get_item_by_id(id)?)
    }

    /// Resolves an image name, falling back to `default.jpg` when missing.
    pub fn image_path(&self, name: &str) -> ServiceResult<PathBuf> {
        Ok(self.images.resolve_or_default(name)?)
    }
}
