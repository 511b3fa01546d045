#![allow(dead_code)]

use listkeeper::{CollectingSink, FsBackend, ListStore, SequentialIds};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestEnv {
    // Keeps the directory alive until the test is done
    pub _temp_dir: TempDir,
    pub root: PathBuf,
    pub sink: Arc<CollectingSink>,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().join("lists");
        Self {
            _temp_dir: temp_dir,
            root,
            sink: Arc::new(CollectingSink::new()),
        }
    }

    /// A fresh store over the same directory, as after a restart.
    pub fn store(&self) -> ListStore<FsBackend> {
        ListStore::with_backend(FsBackend::new(&self.root))
            .expect("tokio runtime")
            .with_sink(self.sink.clone())
    }

    /// Like [`TestEnv::store`] but with predictable ids.
    pub fn sequential_store(&self) -> ListStore<FsBackend> {
        self.store().with_id_generator(SequentialIds::new("id-"))
    }

    pub fn list_file(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }
}

pub fn texts(list: &listkeeper::List) -> Vec<&str> {
    list.items.iter().map(|i| i.text.as_str()).collect()
}
