mod common;

use common::{texts, TestEnv};
use listkeeper::ordering::is_ordered;
use listkeeper::{ErrorKind, ListStore, MemBackend};
use std::fs;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rapid_toggles_never_overlap_and_last_state_wins() {
    let backend = MemBackend::new();
    backend.set_write_delay(Some(Duration::from_millis(2)));
    let mut store = ListStore::with_backend(backend).unwrap();

    let a = store.create_list("A").unwrap().value.id;
    let b = store.create_list("B").unwrap().value.id;
    let item_a = store.add_item(&a, "x").unwrap().value;
    let item_b = store.add_item(&b, "y").unwrap().value;

    for _ in 0..15 {
        store.toggle_item(&a, &item_a.id).unwrap();
        store.toggle_item(&b, &item_b.id).unwrap();
    }
    store.flush().await;

    let backend = store.backend();
    assert_eq!(backend.overlapping_writes(), 0);
    assert_eq!(backend.write_count(&a), 17);
    assert_eq!(backend.write_count(&b), 17);
    assert_eq!(backend.stored(&a).as_ref(), store.list(&a));
    assert_eq!(backend.stored(&b).as_ref(), store.list(&b));
    assert!(store.list(&a).unwrap().items[0].completed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_interleaved_mutations_survive_restart() {
    let env = TestEnv::new();
    let mut store = env.store();
    store.load().await.unwrap();

    let ids: Vec<String> = (0..5)
        .map(|n| store.create_list(&format!("list {n}")).unwrap().value.id)
        .collect();
    for round in 0..10 {
        for id in &ids {
            let item = store.add_item(id, &format!("item {round}")).unwrap().value;
            if round % 3 == 0 {
                store.toggle_item(id, &item.id).unwrap();
            }
        }
    }
    store.delete_list(&ids[2]).unwrap();
    store.flush().await;

    let mut reopened = env.store();
    let report = reopened.load().await.unwrap();
    assert_eq!(report.loaded, 4);
    assert_eq!(reopened.lists(), store.lists());
    for list in reopened.lists() {
        assert!(is_ordered(&list.items));
        assert_eq!(list.items.len(), 10);
    }
    assert!(env.sink.is_empty());
}

#[tokio::test]
async fn test_remove_of_vanished_file_reports_not_found() {
    let env = TestEnv::new();
    let mut store = env.store();
    store.load().await.unwrap();
    let id = store.create_list("Groceries").unwrap().value.id;
    store.flush().await;

    fs::remove_file(env.list_file(&id)).unwrap();
    let err = store.delete_list(&id).unwrap().persisted.wait().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(store.is_empty());
    assert_eq!(env.sink.count(ErrorKind::NotFound), 1);
}

#[tokio::test]
async fn test_write_into_removed_directory_recreates_it() {
    let env = TestEnv::new();
    let mut store = env.store();
    store.load().await.unwrap();
    let id = store.create_list("Groceries").unwrap().value.id;
    store.flush().await;

    fs::remove_dir_all(&env.root).unwrap();
    store.add_item(&id, "Eggs").unwrap().persist().await.unwrap();

    assert!(env.list_file(&id).exists());
}

#[tokio::test]
async fn test_import_legacy_blob() {
    let env = TestEnv::new();
    let mut store = env.sequential_store();
    store.load().await.unwrap();
    let existing = store.create_list("Existing").unwrap().value.id;

    let legacy_path = env._temp_dir.path().join("lists.json");
    fs::write(
        &legacy_path,
        r#"[
            {"id":"1700000000000","name":"Groceries","items":[
                {"id":"1700000000005","text":"Milk","completed":true},
                {"id":"1700000000005","text":"Eggs","completed":false}]},
            {"id":"1700000000000","name":"Chores","items":[]},
            {"id":"1700000000009","name":"   ","items":[]}
        ]"#,
    )
    .unwrap();

    let report = store.import_legacy(&legacy_path).await.unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.skipped_lists, 1);
    assert_eq!(report.reassigned_ids, 2);
    assert_eq!(store.len(), 3);
    assert_eq!(store.selected_id(), Some(existing.as_str()));

    store.flush().await;
    let mut reopened = env.store();
    reopened.load().await.unwrap();
    assert_eq!(reopened.len(), 3);
    let groceries = reopened.list("1700000000000").unwrap();
    assert_eq!(groceries.name, "Groceries");
    assert_eq!(texts(groceries), vec!["Eggs", "Milk"]);
    assert!(env.sink.is_empty());
}

#[tokio::test]
async fn test_import_missing_legacy_file_is_io_error() {
    let env = TestEnv::new();
    let mut store = env.store();
    let err = store
        .import_legacy(env._temp_dir.path().join("absent.json"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_closure_sink_sees_load_failures() {
    let env = TestEnv::new();
    fs::create_dir_all(&env.root).unwrap();
    fs::write(env.root.join("broken.json"), "[]").unwrap();

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen_in_sink = Arc::clone(&seen);
    let mut store = env.store().with_sink(Arc::new(move |err: &listkeeper::StoreError| {
        seen_in_sink.lock().unwrap().push(err.kind());
    }));

    let report = store.load().await.unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(*seen.lock().unwrap(), vec![ErrorKind::Parse]);
}
