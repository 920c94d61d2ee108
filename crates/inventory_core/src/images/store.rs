//! Filesystem image store with SHA-256 content addressing.
//!
//! Blobs are stored flat as `{root}/{sha256-hex}.jpg`. `default.jpg` in the
//! same directory is the fallback asset served for missing images.

use crate::error::ErrorKind;
use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

/// Extension appended to every stored blob.
pub const IMAGE_EXTENSION: &str = "jpg";
/// Fallback asset expected in the image root.
pub const DEFAULT_IMAGE_NAME: &str = "default.jpg";
const ALLOWED_SUFFIXES: &[&str] = &[".jpg", ".jpeg"];

pub type ImageResult<T> = Result<T, ImageError>;

/// Errors from image store operations.
#[derive(Debug)]
pub enum ImageError {
    /// Requested name escapes the root or is not an allowed image file.
    InvalidReference {
        requested: String,
        reason: &'static str,
    },
    /// Name is valid but no file exists at the resolved path.
    NotFound(PathBuf),
    Io(std::io::Error),
}

impl ImageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidReference { .. } => ErrorKind::InvalidReference,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Io(_) => ErrorKind::Storage,
        }
    }
}

impl Display for ImageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidReference { requested, reason } => {
                write!(f, "invalid image path `{requested}`: {reason}")
            }
            Self::NotFound(path) => write!(f, "image not found: {}", path.display()),
            Self::Io(err) => write!(f, "image store error: {err}"),
        }
    }
}

impl Error for ImageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::InvalidReference { .. } | Self::NotFound(_) => None,
        }
    }
}

impl From<std::io::Error> for ImageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Content-addressed blob store rooted at one directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Opens the store, creating `root` when missing.
    ///
    /// The root is canonicalized so resolved paths are absolute.
    pub fn open(root: impl AsRef<Path>) -> ImageResult<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;
        let root = std::fs::canonicalize(root)?;

        if !root.join(DEFAULT_IMAGE_NAME).is_file() {
            warn!(
                "event=image_store_open module=images status=degraded reason=missing_default root={}",
                root.display()
            );
        }
        info!(
            "event=image_store_open module=images status=ok root={}",
            root.display()
        );
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the fallback asset. It may not exist.
    pub fn fallback_path(&self) -> PathBuf {
        self.root.join(DEFAULT_IMAGE_NAME)
    }

    /// Stores `bytes` unless identical content is already present.
    ///
    /// Returns the file name used as the item's image reference.
    pub fn put(&self, bytes: &[u8]) -> ImageResult<String> {
        let name = reference_for(bytes);
        let path = self.root.join(&name);

        match std::fs::metadata(&path) {
            Ok(_) => {
                debug!("event=image_put module=images status=ok created=false name={name}");
                return Ok(name);
            }
            Err(err) if err.kind() == IoErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        // Publish through a temp file so readers never see a partial blob.
        let mut staged = NamedTempFile::new_in(&self.root)?;
        staged.write_all(bytes)?;
        staged.flush()?;

        let created = match staged.persist_noclobber(&path) {
            Ok(_) => true,
            Err(err) if err.error.kind() == IoErrorKind::AlreadyExists => false,
            Err(err) => return Err(err.error.into()),
        };

        info!(
            "event=image_put module=images status=ok created={} bytes={} name={}",
            created,
            bytes.len(),
            name
        );
        Ok(name)
    }

    /// Resolves a requested file name to an existing blob path.
    ///
    /// # Errors
    /// - `InvalidReference` when the name escapes the root or lacks an allowed
    ///   image suffix.
    /// - `NotFound` when the name is acceptable but no file exists.
    pub fn resolve(&self, requested: &str) -> ImageResult<PathBuf> {
        let candidate = self.candidate_path(requested)?;

        match std::fs::metadata(&candidate) {
            Ok(meta) if meta.is_file() => Ok(candidate),
            Ok(_) => Err(ImageError::NotFound(candidate)),
            Err(err) if err.kind() == IoErrorKind::NotFound => {
                Err(ImageError::NotFound(candidate))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Like `resolve`, but substitutes the fallback asset for missing files.
    ///
    /// Invalid references are returned as errors, never masked.
    pub fn resolve_or_default(&self, requested: &str) -> ImageResult<PathBuf> {
        match self.resolve(requested) {
            Err(ImageError::NotFound(path)) => {
                debug!(
                    "event=image_resolve module=images status=fallback path={}",
                    path.display()
                );
                let fallback = self.fallback_path();
                if fallback.is_file() {
                    Ok(fallback)
                } else {
                    Err(ImageError::NotFound(fallback))
                }
            }
            other => other,
        }
    }

    fn candidate_path(&self, requested: &str) -> ImageResult<PathBuf> {
        let invalid = |reason: &'static str| ImageError::InvalidReference {
            requested: requested.to_string(),
            reason,
        };

        if requested.contains('\0') {
            return Err(invalid("contains a NUL byte"));
        }

        let candidate = self.root.join(clean_path(requested));
        let relative = candidate
            .strip_prefix(&self.root)
            .map_err(|_| invalid("escapes the image directory"))?;
        if matches!(relative.components().next(), Some(Component::ParentDir)) {
            return Err(invalid("escapes the image directory"));
        }

        let has_allowed_suffix = candidate
            .to_str()
            .is_some_and(|path| ALLOWED_SUFFIXES.iter().any(|suffix| path.ends_with(suffix)));
        if !has_allowed_suffix {
            return Err(invalid("does not end with .jpg or .jpeg"));
        }

        Ok(candidate)
    }
}

/// Computes the reference `put` would return for `bytes`.
pub fn reference_for(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{}.{IMAGE_EXTENSION}", hex::encode(digest))
}

/// Lexically normalizes `name` into a relative path.
///
/// `.` segments and root markers are dropped and `..` consumes the previous
/// segment. Leading `..` segments that cannot be consumed are kept, so the
/// caller can detect an escape.
fn clean_path(name: &str) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(_) => parts.push(component),
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                _ => parts.push(component),
            },
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    parts.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::{clean_path, reference_for};
    use std::path::PathBuf;

    #[test]
    fn clean_path_collapses_inner_parent_segments() {
        assert_eq!(clean_path("a/./b/../c.jpg"), PathBuf::from("a/c.jpg"));
        assert_eq!(clean_path("/abs/x.jpg"), PathBuf::from("abs/x.jpg"));
        assert_eq!(clean_path("../../etc/passwd"), PathBuf::from("../../etc/passwd"));
        assert_eq!(clean_path("a/../../x.jpg"), PathBuf::from("../x.jpg"));
        assert_eq!(clean_path(""), PathBuf::new());
    }

    #[test]
    fn reference_is_lowercase_sha256_hex_with_jpg_extension() {
        assert_eq!(
            reference_for(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855.jpg"
        );
        let name = reference_for(b"jacket photo");
        assert_eq!(name.len(), 64 + 4);
        assert!(name.ends_with(".jpg"));
        assert!(name[..64]
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}
