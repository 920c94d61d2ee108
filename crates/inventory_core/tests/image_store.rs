use inventory_core::images::store::{reference_for, DEFAULT_IMAGE_NAME};
use inventory_core::{ErrorKind, ImageError, ImageStore};

const PHOTO: [u8; 32] = [7; 32];

#[test]
fn put_names_blobs_by_content_hash() {
    let dir = tempfile::tempdir().unwrap();
    let store = ImageStore::open(dir.path()).unwrap();

    let name = store.put(&PHOTO).unwrap();
    assert_eq!(name, reference_for(&PHOTO));
    assert!(name.ends_with(".jpg"));
    assert_eq!(std::fs::read(store.root().join(&name)).unwrap(), PHOTO);

    let other = store.put(b"another photo").unwrap();
    assert_ne!(name, other);
}

#[test]
fn repeated_put_returns_same_name_and_never_rewrites() {
    let dir = tempfile::tempdir().unwrap();
    let store = ImageStore::open(dir.path()).unwrap();

    let first = store.put(&PHOTO).unwrap();
    let path = store.root().join(&first);
    // Mark the stored blob; a rewrite would restore the original bytes.
    std::fs::write(&path, b"marker").unwrap();

    let second = store.put(&PHOTO).unwrap();
    assert_eq!(first, second);
    assert_eq!(std::fs::read(&path).unwrap(), b"marker");

    let entries = std::fs::read_dir(store.root()).unwrap().count();
    assert_eq!(entries, 1, "no temp files or duplicates left behind");
}

#[test]
fn resolve_returns_stored_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let store = ImageStore::open(dir.path()).unwrap();
    let name = store.put(&PHOTO).unwrap();

    let path = store.resolve(&name).unwrap();
    assert!(path.is_absolute());
    assert!(path.starts_with(store.root()));
    assert_eq!(std::fs::read(path).unwrap(), PHOTO);

    let dotted = format!("./{name}");
    assert_eq!(store.resolve(&dotted).unwrap(), store.root().join(&name));
}

#[test]
fn traversal_attempts_are_invalid_references() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    let store = ImageStore::open(&images).unwrap();
    std::fs::write(dir.path().join("secret.jpg"), b"outside").unwrap();

    for requested in [
        "../../etc/passwd",
        "../secret.jpg",
        "nested/../../secret.jpg",
        "..",
    ] {
        let err = store.resolve(requested).unwrap_err();
        assert!(
            matches!(err, ImageError::InvalidReference { .. }),
            "{requested}: {err}"
        );
        assert_eq!(err.kind(), ErrorKind::InvalidReference);
    }
}

#[test]
fn disallowed_suffixes_are_invalid_references() {
    let dir = tempfile::tempdir().unwrap();
    let store = ImageStore::open(dir.path()).unwrap();
    std::fs::write(store.root().join("notes.txt"), b"text").unwrap();

    for requested in ["notes.txt", "photo.png", "photo.JPG", "", "."] {
        let err = store.resolve(requested).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidReference, "{requested:?}");
    }
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = ImageStore::open(dir.path()).unwrap();

    let err = store.resolve("missing.jpg").unwrap_err();
    assert!(matches!(err, ImageError::NotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(store.resolve("missing.jpeg").unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn fallback_is_used_only_for_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = ImageStore::open(dir.path()).unwrap();

    let err = store.resolve_or_default("missing.jpg").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound, "no default.jpg yet");

    std::fs::write(store.root().join(DEFAULT_IMAGE_NAME), b"default").unwrap();
    assert_eq!(
        store.resolve_or_default("missing.jpg").unwrap(),
        store.fallback_path()
    );

    let err = store.resolve_or_default("../../etc/passwd").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidReference);

    let name = store.put(&PHOTO).unwrap();
    assert_eq!(
        store.resolve_or_default(&name).unwrap(),
        store.root().join(name)
    );
}
