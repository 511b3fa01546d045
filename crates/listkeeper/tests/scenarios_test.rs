mod common;

use common::{texts, TestEnv};
use listkeeper::{ErrorKind, List, StorageBackend};
use std::fs;

#[tokio::test]
async fn test_create_list_writes_file() {
    let env = TestEnv::new();
    let mut store = env.sequential_store();
    store.load().await.unwrap();

    let list = store.create_list("Groceries").unwrap().persist().await.unwrap();

    assert_eq!(store.len(), 1);
    assert!(store.lists()[0].items.is_empty());
    let on_disk: List =
        serde_json::from_str(&fs::read_to_string(env.list_file(&list.id)).unwrap()).unwrap();
    assert_eq!(on_disk, list);
}

#[tokio::test]
async fn test_grocery_walkthrough() {
    let env = TestEnv::new();
    let mut store = env.sequential_store();
    store.load().await.unwrap();

    let id = store.create_list("Groceries").unwrap().value.id;
    let eggs = store.add_item(&id, "Eggs").unwrap().value;
    let milk = store.add_item(&id, "Milk").unwrap().value;
    assert_eq!(texts(store.list(&id).unwrap()), vec!["Milk", "Eggs"]);
    assert!(store.list(&id).unwrap().items.iter().all(|i| !i.completed));

    store.toggle_item(&id, &milk.id).unwrap();
    assert_eq!(texts(store.list(&id).unwrap()), vec!["Eggs", "Milk"]);
    assert!(!store.list(&id).unwrap().items[0].completed);

    store.toggle_item(&id, &eggs.id).unwrap();
    assert_eq!(texts(store.list(&id).unwrap()), vec!["Eggs", "Milk"]);
    assert_eq!(store.list(&id).unwrap().completed_count(), 2);

    store.flush().await;

    // A restart sees the same thing.
    let mut reopened = env.store();
    reopened.load().await.unwrap();
    assert_eq!(reopened.lists(), store.lists());
}

#[tokio::test]
async fn test_delete_removes_file_and_second_delete_fails() {
    let env = TestEnv::new();
    let mut store = env.sequential_store();
    store.load().await.unwrap();

    let id = store.create_list("Groceries").unwrap().value.id;
    store.flush().await;
    assert!(env.list_file(&id).exists());

    store.delete_list(&id).unwrap().persist().await.unwrap();
    assert!(store.is_empty());
    assert!(!env.list_file(&id).exists());

    let err = store.delete_list(&id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_corrupt_file_is_isolated() {
    let env = TestEnv::new();
    let mut store = env.sequential_store();
    store.load().await.unwrap();
    let a = store.create_list("A").unwrap().value.id;
    let b = store.create_list("B").unwrap().value.id;
    store.add_item(&b, "x").unwrap();
    store.flush().await;

    fs::write(env.list_file(&a), "{ \"id\": \"").unwrap();

    let mut reopened = env.store();
    let report = reopened.load().await.unwrap();
    assert_eq!(report.loaded, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(reopened.lists()[0].id, b);
    assert_eq!(texts(&reopened.lists()[0]), vec!["x"]);
    assert_eq!(env.sink.count(ErrorKind::Parse), 1);
}

#[tokio::test]
async fn test_foreign_files_are_ignored() {
    let env = TestEnv::new();
    let mut store = env.sequential_store();
    store.load().await.unwrap();
    store.create_list("A").unwrap();
    store.flush().await;

    fs::write(env.root.join("README.txt"), "not a list").unwrap();
    fs::write(env.root.join(".half-written.tmp"), "{").unwrap();

    let mut reopened = env.store();
    let report = reopened.load().await.unwrap();
    assert_eq!(report.loaded, 1);
    assert_eq!(report.skipped, 0);
    assert!(!env.root.join(".half-written.tmp").exists());
}

#[tokio::test]
async fn test_lists_reload_in_creation_order() {
    let env = TestEnv::new();
    let mut store = env.store();
    store.load().await.unwrap();
    for name in ["Groceries", "Chores", "Packing", "Gifts"] {
        store.create_list(name).unwrap();
    }
    store.flush().await;

    let mut reopened = env.store();
    reopened.load().await.unwrap();
    let names: Vec<_> = reopened.lists().iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Groceries", "Chores", "Packing", "Gifts"]);
}

#[tokio::test]
async fn test_no_tmp_files_left_behind() {
    let env = TestEnv::new();
    let mut store = env.sequential_store();
    store.load().await.unwrap();
    let id = store.create_list("Groceries").unwrap().value.id;
    for n in 0..5 {
        store.add_item(&id, &format!("item {n}")).unwrap();
    }
    store.flush().await;

    for entry in fs::read_dir(&env.root).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
    }
}

#[tokio::test]
async fn test_backend_round_trip() {
    let env = TestEnv::new();
    let mut store = env.sequential_store();
    store.load().await.unwrap();
    let id = store.create_list("Groceries").unwrap().value.id;
    let eggs = store.add_item(&id, "Eggs").unwrap().value;
    store.add_item(&id, "Milk").unwrap();
    store.toggle_item(&id, &eggs.id).unwrap();
    store.flush().await;

    let outcome = store.backend().load_all().unwrap();
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.lists, store.lists());
}
