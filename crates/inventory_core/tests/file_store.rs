use inventory_core::{ErrorKind, ItemRepository, JsonFileItemRepository, NewItem, RepoError};
use serde_json::{json, Value};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn missing_or_blank_document_is_an_empty_collection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("items.json");
    let repo = JsonFileItemRepository::open(&path).unwrap();

    assert!(repo.get_all_items().unwrap().is_empty());
    assert!(!path.exists(), "reads must not create the document");
    assert_eq!(repo.get_item_by_id("1").unwrap_err().kind(), ErrorKind::NotFound);

    std::fs::write(&path, "").unwrap();
    assert!(repo.get_all_items().unwrap().is_empty());
}

#[test]
fn document_keeps_the_items_envelope_without_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("items.json");
    let repo = JsonFileItemRepository::open(&path).unwrap();

    repo.insert_item(&NewItem::new("jacket", "fashion", "a.jpg"))
        .unwrap();
    repo.insert_item(&NewItem::new("kettle", "kitchen", "b.jpg"))
        .unwrap();

    let stored: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(
        stored,
        json!({
            "items": [
                { "name": "jacket", "category": "fashion", "image": "a.jpg" },
                { "name": "kettle", "category": "kitchen", "image": "b.jpg" }
            ]
        })
    );
}

#[test]
fn ids_are_positions_in_an_existing_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("items.json");
    std::fs::write(
        &path,
        r#"{"items":[
            {"name":"first","category":"a","image":"1.jpg"},
            {"name":"second","category":"b","image":"2.jpg"}
        ]}"#,
    )
    .unwrap();
    let repo = JsonFileItemRepository::open(&path).unwrap();

    assert_eq!(repo.get_item_by_id("2").unwrap().name, "second");
    assert_eq!(repo.get_item_by_id("3").unwrap_err().kind(), ErrorKind::NotFound);

    let id = repo
        .insert_item(&NewItem::new("third", "c", "3.jpg"))
        .unwrap();
    assert_eq!(id, 3);
    assert_eq!(repo.get_item_by_id("1").unwrap().name, "first");
    assert_eq!(repo.get_item_by_id("3").unwrap().name, "third");
}

#[test]
fn corrupt_document_is_a_storage_error_and_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("items.json");
    std::fs::write(&path, "{ not json").unwrap();
    let repo = JsonFileItemRepository::open(&path).unwrap();

    let err = repo.get_all_items().unwrap_err();
    assert!(matches!(err, RepoError::Document(_)));
    assert_eq!(err.kind(), ErrorKind::Storage);

    let err = repo
        .insert_item(&NewItem::new("jacket", "fashion", "a.jpg"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
}

#[test]
fn concurrent_inserts_in_one_process_lose_no_updates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("items.json");

    let workers = 8;
    let per_worker = 5;
    let barrier = Arc::new(Barrier::new(workers));
    let handles: Vec<_> = (0..workers)
        .map(|worker| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let repo = JsonFileItemRepository::open(&path).unwrap();
                barrier.wait();
                for n in 0..per_worker {
                    repo.insert_item(&NewItem::new(format!("w{worker}-{n}"), "bulk", "a.jpg"))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let repo = JsonFileItemRepository::open(&path).unwrap();
    let items = repo.get_all_items().unwrap();
    assert_eq!(items.len(), workers * per_worker);
    for (index, item) in items.iter().enumerate() {
        assert_eq!(item.id, index as i64 + 1);
    }
}
