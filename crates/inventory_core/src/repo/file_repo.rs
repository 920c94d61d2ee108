//! JSON document item repository.
//!
//! # Responsibility
//! - Keep the whole collection in one `{ "items": [...] }` document.
//! - Derive identifiers from position: id `k` is the k-th stored entry.
//!
//! # Invariants
//! - Identifiers are never persisted; they stay stable because the document
//!   is append-only.
//! - A missing or empty document is an empty collection, not an error.
//! - Within one process, read-modify-write cycles on the same path are
//!   serialized by a per-path lock. Separate processes sharing the file are
//!   not coordinated and can lose updates.
//! - The overwrite is not crash-atomic: a crash mid-write can truncate the
//!   document.

use crate::model::item::{Item, ItemId, NewItem};
use crate::repo::item_repo::{resolve_requested_id, ItemRepository, RepoError, RepoResult};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

static DOCUMENT_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// On-disk shape of the items document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ItemsDocument {
    #[serde(default)]
    items: Vec<NewItem>,
}

/// Item repository persisted as a single JSON document.
pub struct JsonFileItemRepository {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonFileItemRepository {
    /// Binds the repository to `path`. The file is created on first insert.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        let path = std::path::absolute(path.as_ref())?;
        let lock = document_lock(&path);
        Ok(Self { path, lock })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_document(&self) -> MutexGuard<'_, ()> {
        // The guarded value is `()`, so a poisoned lock carries no broken state.
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_document(&self) -> RepoResult<ItemsDocument> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == IoErrorKind::NotFound => {
                return Ok(ItemsDocument::default())
            }
            Err(err) => return Err(err.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(ItemsDocument::default());
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    fn write_document(&self, document: &ItemsDocument) -> RepoResult<()> {
        // Serialize before touching the file so encoding failures leave it intact.
        let bytes = serde_json::to_vec(document)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn append(&self, item: &NewItem) -> RepoResult<ItemId> {
        let _guard = self.lock_document();
        let mut document = self.read_document()?;
        document.items.push(item.clone());
        self.write_document(&document)?;
        Ok(document.items.len() as ItemId)
    }
}

impl ItemRepository for JsonFileItemRepository {
    fn insert_item(&self, item: &NewItem) -> RepoResult<ItemId> {
        item.validate()?;

        let result = self.append(item);
        match &result {
            Ok(id) => info!(
                "event=item_insert module=repo status=ok backend=file item_id={}",
                id
            ),
            Err(err) => warn!(
                "event=item_insert module=repo status=error backend=file error_kind={} error={}",
                err.kind(),
                err
            ),
        }
        result
    }

    fn get_all_items(&self) -> RepoResult<Vec<Item>> {
        let document = {
            let _guard = self.lock_document();
            self.read_document()?
        };

        document
            .items
            .into_iter()
            .enumerate()
            .map(|(index, entry)| positional_item(index, entry))
            .collect()
    }

    fn get_item_by_id(&self, id: &str) -> RepoResult<Item> {
        let id = resolve_requested_id(id)?;
        let document = {
            let _guard = self.lock_document();
            self.read_document()?
        };

        let index = usize::try_from(id - 1).map_err(|_| RepoError::NotFound(id))?;
        match document.items.into_iter().nth(index) {
            Some(entry) => positional_item(index, entry),
            None => Err(RepoError::NotFound(id)),
        }
    }
}

fn positional_item(index: usize, entry: NewItem) -> RepoResult<Item> {
    let id = index as ItemId + 1;
    if entry.validate().is_err() {
        return Err(RepoError::InvalidData(format!(
            "document entry {id} has an empty required field"
        )));
    }
    Ok(entry.into_item(id))
}

fn document_lock(path: &Path) -> Arc<Mutex<()>> {
    let mut locks = DOCUMENT_LOCKS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    locks
        .entry(path.to_path_buf())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}
