use super::backend::{LoadOutcome, StorageBackend};
use crate::error::{Result, StoreError};
use crate::model::{check_record, List};
use crate::ordering::reorder_in_place;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

/// In-memory storage backend for testing.
///
/// Records are kept as serialized JSON keyed by list id, so a corrupt record
/// can be planted with [`MemBackend::insert_raw`]. Calls run on worker
/// threads, hence `Mutex` and atomics rather than `RefCell`.
///
/// The backend also watches the write discipline: it counts writes per id and
/// records any moment where two writes for the same id overlap.
#[derive(Default)]
pub struct MemBackend {
    records: Mutex<BTreeMap<String, String>>,
    writes: Mutex<HashMap<String, usize>>,
    in_flight: Mutex<HashSet<String>>,
    overlapping_writes: AtomicUsize,
    simulate_write_error: AtomicBool,
    write_delay: Mutex<Option<Duration>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking test thread must not wedge every later assertion.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    /// Make every save/remove sleep, widening the window for races.
    pub fn set_write_delay(&self, delay: Option<Duration>) {
        *lock(&self.write_delay) = delay;
    }

    /// Plant raw content under `id`, bypassing serialization.
    pub fn insert_raw(&self, id: &str, content: &str) {
        lock(&self.records).insert(id.to_string(), content.to_string());
    }

    /// Decoded record for `id`, if one is stored and parses.
    pub fn stored(&self, id: &str) -> Option<List> {
        let records = lock(&self.records);
        records
            .get(id)
            .and_then(|raw| serde_json::from_str(raw).ok())
    }

    pub fn contains(&self, id: &str) -> bool {
        lock(&self.records).contains_key(id)
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of save/remove calls that reached this backend for `id`.
    pub fn write_count(&self, id: &str) -> usize {
        lock(&self.writes).get(id).copied().unwrap_or(0)
    }

    pub fn total_writes(&self) -> usize {
        lock(&self.writes).values().sum()
    }

    /// How many writes started while another write for the same id was running.
    pub fn overlapping_writes(&self) -> usize {
        self.overlapping_writes.load(Ordering::SeqCst)
    }

    fn guarded_write<F>(&self, id: &str, op: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> Result<()>,
    {
        *lock(&self.writes).entry(id.to_string()).or_default() += 1;

        if !lock(&self.in_flight).insert(id.to_string()) {
            self.overlapping_writes.fetch_add(1, Ordering::SeqCst);
        }

        let delay = *lock(&self.write_delay);
        if let Some(delay) = delay {
            thread::sleep(delay);
        }

        let result = if self.simulate_write_error.load(Ordering::SeqCst) {
            Err(StoreError::Io(std::io::Error::other("Simulated write error")))
        } else {
            op(&mut *lock(&self.records))
        };

        lock(&self.in_flight).remove(id);
        result
    }
}

impl StorageBackend for MemBackend {
    fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }

    fn load_all(&self) -> Result<LoadOutcome> {
        let records = lock(&self.records);
        let mut outcome = LoadOutcome::default();

        for (id, raw) in records.iter() {
            let path = PathBuf::from(format!("memory://{}", id));
            let parsed = serde_json::from_str::<List>(raw)
                .map_err(|e| e.to_string())
                .and_then(|list| check_record(&list).map(|_| list));
            match parsed {
                Ok(mut list) => {
                    reorder_in_place(&mut list.items);
                    outcome.lists.push(list);
                }
                Err(message) => outcome.failures.push(StoreError::Parse { path, message }),
            }
        }
        Ok(outcome)
    }

    fn save(&self, list: &List) -> Result<()> {
        let content = serde_json::to_string(list).map_err(StoreError::Serialization)?;
        self.guarded_write(&list.id, |records| {
            records.insert(list.id.clone(), content);
            Ok(())
        })
    }

    fn remove(&self, id: &str) -> Result<()> {
        self.guarded_write(id, |records| match records.remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::list_not_found(id)),
        })
    }
}
