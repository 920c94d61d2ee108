//! Core persistence layer for the inventory service.
//! Items live behind one repository contract with three interchangeable
//! backends; photos live in a content-addressed image store.

pub mod config;
pub mod db;
pub mod error;
pub mod images;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, StoreConfig};
pub use error::ErrorKind;
pub use images::store::{ImageError, ImageResult, ImageStore};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::item::{parse_item_id, Item, ItemId, ItemValidationError, NewItem};
pub use repo::file_repo::JsonFileItemRepository;
pub use repo::item_repo::{ItemRepository, RepoError, RepoResult};
pub use repo::sqlite_repo::{SqliteDenormalizedItemRepository, SqliteNormalizedItemRepository};
pub use service::inventory_service::{InventoryService, ServiceError, ServiceResult};
pub use store::{BackendKind, InitError, ItemBackend};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
