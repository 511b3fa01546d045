//! # List Store
//!
//! [`ListStore`] owns every list in memory and is the only code that mutates
//! them. It is an explicit object: build one, hand it to whoever needs it.
//!
//! ## Lifecycle
//!
//! ```text
//! construct ──► load().await ──► ready ──► create/delete/add/toggle ... ──► flush().await
//! ```
//!
//! ## Mutations
//!
//! Every mutating call:
//! 1. validates input (blank text, unknown ids) before touching any state,
//! 2. applies the change to the in-memory list and re-establishes the
//!    pending-before-completed order,
//! 3. queues exactly one write for the affected list and returns at once.
//!
//! The caller gets an [`Applied`] holding the new in-memory value and a
//! [`PersistTicket`] for the write. A failed write does not roll back memory;
//! the next write of the same list carries the state again. Write failures are
//! also sent to the error sink.
//!
//! Mutations take `&mut self`: one owner drives the store from one thread, so
//! the in-memory map needs no locking. Persistence runs on the tokio runtime
//! captured at construction.

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::id::{IdGenerator, UuidIds};
use crate::legacy::{self, ImportReport};
use crate::model::{validate_name, validate_text, Item, List};
use crate::ordering::reorder_in_place;
use crate::sink::{ErrorSink, TracingSink};
use crate::store::backend::StorageBackend;
use crate::store::fs_backend::FsBackend;
use crate::store::writer::{PersistTicket, WriteOp, WriteQueue};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info};

/// Result of a mutation: the in-memory value plus its pending write.
#[derive(Debug)]
pub struct Applied<T> {
    pub value: T,
    pub persisted: PersistTicket,
}

impl<T> Applied<T> {
    /// Waits for the write and hands back the value if it succeeded.
    pub async fn persist(self) -> Result<T> {
        self.persisted.wait().await?;
        Ok(self.value)
    }
}

/// Summary returned by [`ListStore::load`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

pub struct ListStore<B: StorageBackend + 'static> {
    backend: Arc<B>,
    queue: WriteQueue<B>,
    ids: Box<dyn IdGenerator>,
    lists: Vec<List>,
    selected: Option<String>,
}

impl ListStore<FsBackend> {
    /// Builds a directory-backed store from configuration.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let backend = FsBackend::new(config.data_dir()?).with_file_ext(&config.file_ext());
        Self::with_backend(backend)
    }
}

impl<B: StorageBackend + 'static> ListStore<B> {
    /// Must be called from within a tokio runtime; use [`ListStore::with_backend_on`]
    /// to pass a handle explicitly.
    pub fn with_backend(backend: B) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| StoreError::Runtime(e.to_string()))?;
        Ok(Self::with_backend_on(backend, runtime))
    }

    pub fn with_backend_on(backend: B, runtime: Handle) -> Self {
        let backend = Arc::new(backend);
        let queue = WriteQueue::new(Arc::clone(&backend), Arc::new(TracingSink), runtime);
        Self {
            backend,
            queue,
            ids: Box::new(UuidIds),
            lists: Vec::new(),
            selected: None,
        }
    }

    /// Replaces the error sink, including for writes already queued.
    pub fn with_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.queue.set_sink(sink);
        self
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // --- Loading ---

    /// Replaces the in-memory state with what the backend holds.
    ///
    /// Pending writes are flushed first, so a reload never reads a file that
    /// is still being written. Records that fail to parse are reported to the
    /// sink and skipped. Fails only when the storage location cannot be
    /// prepared or enumerated.
    pub async fn load(&mut self) -> Result<LoadReport> {
        self.queue.flush().await;

        let backend = Arc::clone(&self.backend);
        let outcome = self
            .queue
            .runtime()
            .spawn_blocking(move || {
                backend.ensure_ready()?;
                backend.load_all()
            })
            .await
            .map_err(|e| StoreError::Runtime(format!("load task failed: {e}")))??;

        let sink = self.queue.sink();
        for failure in &outcome.failures {
            sink.report(failure);
        }

        let report = LoadReport {
            loaded: outcome.lists.len(),
            skipped: outcome.failures.len(),
        };
        self.lists = outcome.lists;
        if let Some(selected) = &self.selected {
            if self.position(selected).is_none() {
                self.selected = None;
            }
        }

        info!(
            loaded = report.loaded,
            skipped = report.skipped,
            "lists loaded"
        );
        Ok(report)
    }

    /// Waits for every write queued so far. Call before process exit.
    pub async fn flush(&mut self) {
        self.queue.flush().await;
    }

    // --- Reads ---

    /// All lists, in creation (or load) order.
    pub fn lists(&self) -> &[List] {
        &self.lists
    }

    pub fn list(&self, id: &str) -> Option<&List> {
        self.lists.iter().find(|list| list.id == id)
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The list currently selected, if any.
    pub fn selected(&self) -> Option<&List> {
        self.selected.as_deref().and_then(|id| self.list(id))
    }

    // --- Mutations ---

    /// Creates an empty list and selects it.
    pub fn create_list(&mut self, name: &str) -> Result<Applied<List>> {
        validate_name(name)?;

        let list = List::new(self.ids.next_id(), name.to_string());
        debug!(list_id = %list.id, "creating list");
        self.lists.push(list.clone());
        self.selected = Some(list.id.clone());

        let persisted = self.queue.enqueue(&list.id, WriteOp::Save(list.clone()));
        Ok(Applied {
            value: list,
            persisted,
        })
    }

    /// Removes a list from memory and storage, clearing the selection if it
    /// pointed at it.
    pub fn delete_list(&mut self, id: &str) -> Result<Applied<List>> {
        let pos = self
            .position(id)
            .ok_or_else(|| StoreError::list_not_found(id))?;

        let list = self.lists.remove(pos);
        debug!(list_id = %list.id, "deleting list");
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }

        let persisted = self
            .queue
            .enqueue(&list.id, WriteOp::Remove(list.id.clone()));
        Ok(Applied {
            value: list,
            persisted,
        })
    }

    /// Adds a pending item at the front of the list.
    pub fn add_item(&mut self, list_id: &str, text: &str) -> Result<Applied<Item>> {
        validate_text(text)?;
        let pos = self
            .position(list_id)
            .ok_or_else(|| StoreError::list_not_found(list_id))?;

        let item = Item::new(self.ids.next_id(), text.to_string());
        let list = &mut self.lists[pos];
        list.items.insert(0, item.clone());
        reorder_in_place(&mut list.items);
        debug!(list_id = %list.id, item_id = %item.id, "item added");

        let persisted = self.persist(pos);
        Ok(Applied {
            value: item,
            persisted,
        })
    }

    /// Flips an item's completed flag and re-sorts the list.
    pub fn toggle_item(&mut self, list_id: &str, item_id: &str) -> Result<Applied<Item>> {
        let pos = self
            .position(list_id)
            .ok_or_else(|| StoreError::list_not_found(list_id))?;
        let list = &mut self.lists[pos];
        let item = list
            .item_mut(item_id)
            .ok_or_else(|| StoreError::item_not_found(item_id))?;

        item.completed = !item.completed;
        let toggled = item.clone();
        reorder_in_place(&mut list.items);
        debug!(list_id = %list.id, item_id = %toggled.id, completed = toggled.completed, "item toggled");

        let persisted = self.persist(pos);
        Ok(Applied {
            value: toggled,
            persisted,
        })
    }

    /// Points the selection at `id`, or clears it with `None`. No persistence.
    pub fn select_list(&mut self, id: Option<&str>) -> Result<Option<&List>> {
        match id {
            None => {
                self.selected = None;
                Ok(None)
            }
            Some(id) => {
                let pos = self
                    .position(id)
                    .ok_or_else(|| StoreError::list_not_found(id))?;
                self.selected = Some(id.to_string());
                Ok(Some(&self.lists[pos]))
            }
        }
    }

    // --- Import ---

    /// Imports a single-blob `lists.json` file from older builds.
    ///
    /// Each imported list is registered and persisted to its own file. The
    /// selection is left alone.
    pub async fn import_legacy(&mut self, path: impl AsRef<Path>) -> Result<ImportReport> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(StoreError::Io)?;

        let taken: HashSet<String> = self.lists.iter().map(|l| l.id.clone()).collect();
        let (lists, report) = legacy::parse_and_repair(path, &content, &taken, &*self.ids)?;

        for list in lists {
            self.queue.enqueue(&list.id, WriteOp::Save(list.clone()));
            self.lists.push(list);
        }

        info!(
            path = %path.display(),
            imported = report.imported,
            skipped_lists = report.skipped_lists,
            skipped_items = report.skipped_items,
            reassigned_ids = report.reassigned_ids,
            "legacy lists imported"
        );
        Ok(report)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.lists.iter().position(|list| list.id == id)
    }

    fn persist(&mut self, pos: usize) -> PersistTicket {
        let snapshot = self.lists[pos].clone();
        let id = snapshot.id.clone();
        self.queue.enqueue(&id, WriteOp::Save(snapshot))
    }
}
