//! # listkeeper
//!
//! Named checklists kept as one JSON file per list.
//!
//! The crate is the storage core behind a checklist UI: it owns the lists in
//! memory, keeps pending items ahead of completed ones, and mirrors each list
//! to its own file in a directory. The UI calls into [`ListStore`] and renders
//! whatever state it returns.
//!
//! ## Architecture
//!
//! - [`model`]: `List` and `Item`, plus input validation.
//! - [`ordering`]: the pending-before-completed ordering.
//! - [`id`]: collision-free id generation.
//! - [`store`]: storage backends and the per-list write queue.
//! - [`list_store`]: the public contract (create, delete, add, toggle, select).
//! - [`legacy`]: import of the old single-file format.
//! - [`config`]: where the files live.
//!
//! ## Example
//!
//! ```no_run
//! use listkeeper::{ListStore, StoreConfig};
//!
//! # async fn run() -> listkeeper::Result<()> {
//! let mut store = ListStore::open(&StoreConfig::with_data_dir("/tmp/lists"))?;
//! store.load().await?;
//!
//! let list = store.create_list("Groceries")?.value;
//! store.add_item(&list.id, "Eggs")?;
//! store.add_item(&list.id, "Milk")?;
//!
//! store.flush().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod legacy;
pub mod list_store;
pub mod model;
pub mod ordering;
pub mod sink;
pub mod store;

pub use config::StoreConfig;
pub use error::{EntityKind, ErrorKind, Result, StoreError};
pub use id::{IdGenerator, SequentialIds, UuidIds};
pub use legacy::ImportReport;
pub use list_store::{Applied, ListStore, LoadReport};
pub use model::{Item, List};
pub use sink::{CollectingSink, ErrorSink, TracingSink};
pub use store::{FsBackend, MemBackend, PersistTicket, StorageBackend};
