//! # Storage Layer
//!
//! Lists are persisted one file per list. A write touches exactly one file, so
//! a failed or torn write can only ever affect the list it was writing.
//!
//! ## Layers
//!
//! 1. [`backend::StorageBackend`]: raw, blocking I/O (enumerate, read, write-one, delete-one).
//! 2. [`writer`]: the per-list-id queue that runs backend calls off the caller's
//!    thread, one at a time per id.
//!
//! ## Write Safety
//!
//! - Writes go to a temp file in the same directory and are renamed over the
//!   target, so a reader sees the old record or the new one, never half of one.
//! - Temp files left behind by a crash are swept by `ensure_ready`.
//!
//! ## Load Behavior
//!
//! - Files are visited in name order. UUIDv7 ids sort by creation time, so the
//!   list order survives a restart.
//! - A record that fails to read or parse is skipped and returned as a failure;
//!   the rest still load.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: production directory backend.
//! - [`mem_backend::MemBackend`]: for testing logic without filesystem I/O.
//!
//! ## Storage Layout
//!
//! ```text
//! <data dir>/
//! ├── {list-id}.json           # One record per list
//! └── .{list-id}-{uuid}.tmp    # In-flight write, renamed into place
//! ```

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod writer;

pub use backend::{LoadOutcome, StorageBackend};
pub use fs_backend::FsBackend;
pub use mem_backend::MemBackend;
pub use writer::PersistTicket;
