//! Record-Flow: dependency-tracked change notification for normalized
//! record caches.
//!
//! Many independent watchers register interest in a computed projection of
//! cached data and are re-notified, with a recomputed value, exactly when a
//! record their projection actually touched changes. Writes to records a
//! watcher never read cost it nothing.
//!
//! # Key Features
//!
//! - **Dependency-tracked invalidation**: every read reports the record
//!   keys it touched; broadcasts are matched against that snapshot and only
//!   overlapping batches trigger a re-read
//! - **Caller-chosen delivery**: results are dispatched onto an
//!   [`ExecutionContext`], never run on the registry's notifying thread
//! - **Coalescing**: broadcasts arriving faster than reads complete collapse
//!   into a single re-read reflecting the latest committed state
//! - **Caller-controlled lifetime**: cancellation is explicit, idempotent,
//!   and required before dropping a watcher
//! - **Observable**: the [`Tracer`] hooks expose subscription, matching,
//!   and refresh activity with zero cost when unused
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use record_flow::{
//!     KeySet, Projection, ReadError, RecordKey, Registry, StoreReader,
//!     ThreadContext, Watcher,
//! };
//!
//! struct BookStore { /* ... */ }
//!
//! impl StoreReader for BookStore {
//!     type Value = String;
//!
//!     fn read(&self, root_key: &RecordKey) -> Result<Projection<String>, ReadError> {
//!         let title = self.lookup(root_key)?;
//!         Ok(Projection::new(title, KeySet::from_iter(["Query.1", "Author.5"])))
//!     }
//! }
//!
//! let store = Arc::new(BookStore::open());
//! let registry = Arc::new(Registry::new());
//! let context = Arc::new(ThreadContext::new());
//!
//! let watcher = Watcher::create("Query.1", &store, &registry, context, |result| {
//!     println!("refreshed: {:?}", result);
//! });
//!
//! // A committed write touching Author.5 wakes the watcher; one touching
//! // only Book.9 does not.
//! registry.broadcast(&KeySet::from_iter(["Author.5"]), None);
//!
//! watcher.cancel(); // required before dropping the last reference
//! ```
//!
//! # Collaborators
//!
//! The normalized store itself is out of scope. It participates through two
//! seams: a [`StoreReader`] that performs a transactional read and reports
//! the keys it touched, and the write path calling
//! [`Registry::broadcast`] with each committed batch of changed keys.

#![deny(missing_docs)]

mod context;
mod deps;
mod error;
mod key;
mod reader;
mod registry;
mod tracer;
mod watcher;

pub use context::{ExecutionContext, ManualContext, Task, ThreadContext};
pub use deps::{DependencySet, KeySet};
pub use error::ReadError;
pub use key::{OriginId, RecordKey};
pub use reader::{Projection, StoreReader};
pub use registry::{ChangeObserver, ObserverId, Registry, RegistryBuilder};
pub use tracer::{MatchDecision, NoopTracer, RefreshOutcome, Tracer};
pub use watcher::{WatchResult, Watcher};
