use crate::error::{Result, StoreError};
use crate::model::List;

/// What a full scan of the backend produced.
///
/// Records that could not be read or parsed are isolated in `failures`;
/// one bad record never hides the others.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub lists: Vec<List>,
    pub failures: Vec<StoreError>,
}

/// Abstract interface for raw list storage.
///
/// This trait handles the "how" of storage (filesystem vs memory), while
/// `ListStore` handles the "what" (validation, ordering, selection).
///
/// Methods take `&self` and are called from blocking worker threads, so
/// implementations must be `Send + Sync` and handle their own interior
/// mutability.
pub trait StorageBackend: Send + Sync {
    /// Prepare the storage location. Idempotent.
    fn ensure_ready(&self) -> Result<()>;

    /// Read every stored list.
    /// Returns Err only when the storage location itself cannot be enumerated.
    fn load_all(&self) -> Result<LoadOutcome>;

    /// Write one list, replacing any previous record with the same id.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial reads.
    fn save(&self, list: &List) -> Result<()>;

    /// Delete the record for `id`.
    /// Returns `StoreError::NotFound` when nothing is stored under that id.
    fn remove(&self, id: &str) -> Result<()>;
}
