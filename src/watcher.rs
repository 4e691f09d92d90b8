//! The watcher: a live, dependency-tracked subscription.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::context::ExecutionContext;
use crate::deps::{DependencySet, KeySet};
use crate::key::{OriginId, RecordKey};
use crate::reader::StoreReader;
use crate::registry::{ChangeObserver, ObserverId, Registry};
use crate::tracer::{MatchDecision, RefreshOutcome, Tracer};

/// Result delivered to a watch handler: the projected value or the read
/// failure.
pub type WatchResult<V> = Result<Arc<V>, crate::error::ReadError>;

type Handler<V> = Arc<dyn Fn(WatchResult<V>) + Send + Sync>;

/// A live subscription that re-reads and re-delivers a projected value when
/// its dependencies change.
///
/// Construction subscribes the watcher to the registry and schedules an
/// initial read; the handler then receives exactly one initial result
/// (success or failure), asynchronously on the execution context, before
/// any change-triggered result. Afterwards every broadcast is matched
/// against the keys the last successful read touched: disjoint batches are
/// ignored, overlapping batches trigger a fresh read whose touched keys
/// replace the snapshot wholesale (dependencies can shrink or grow between
/// reads).
///
/// The watcher holds only non-owning references upward: if the reader or
/// the registry is gone, reads and cancellation degrade to silent no-ops.
/// The registry, by contrast, holds a strong reference downward so it can
/// always deliver. Callers therefore **must call [`cancel`](Self::cancel)
/// before dropping their last reference**; a watcher that is never
/// cancelled stays subscribed forever, pinning itself and its handler. That
/// is a resource leak, not a crash hazard.
///
/// # Example
///
/// ```ignore
/// let watcher = Watcher::create(
///     "Query.books",
///     &store,
///     &registry,
///     Arc::new(ThreadContext::new()),
///     |result| match result {
///         Ok(books) => render(&books),
///         Err(err) => show_error(&err),
///     },
/// );
/// // ... later:
/// watcher.cancel();
/// ```
pub struct Watcher<R: StoreReader> {
    this: Weak<Self>,
    id: ObserverId,
    root_key: RecordKey,
    reader: Weak<R>,
    registry: Weak<Registry>,
    context: Arc<dyn ExecutionContext>,
    handler: Handler<R::Value>,
    /// Snapshot from the last successful read; `Unknown` until then.
    deps: Mutex<DependencySet>,
    /// Serializes reads so results are delivered in read-completion order.
    read_lock: Mutex<()>,
    /// Set by a matched broadcast, consumed by the refresh that covers it.
    dirty: AtomicBool,
    cancelled: AtomicBool,
    tracer: Arc<dyn Tracer>,
}

impl<R: StoreReader> Watcher<R> {
    /// Subscribe a new watcher and schedule its initial read.
    ///
    /// Side effects, in order: the watcher registers with `registry`, then
    /// an initial read against `root_key` is submitted to `context`. The
    /// read installs the first dependency snapshot (or leaves it
    /// unestablished on failure) and delivers its result through `handler`.
    ///
    /// If the initial read fails, the failure is delivered as-is and the
    /// watcher stays subscribed, but with no established dependencies it
    /// ignores every broadcast, so it stays dormant until cancelled. There
    /// is no retry on a timer.
    pub fn create(
        root_key: impl Into<RecordKey>,
        reader: &Arc<R>,
        registry: &Arc<Registry>,
        context: Arc<dyn ExecutionContext>,
        handler: impl Fn(WatchResult<R::Value>) + Send + Sync + 'static,
    ) -> Arc<Self> {
        let watcher = Arc::new_cyclic(|this| Self {
            this: this.clone(),
            id: ObserverId::next(),
            root_key: root_key.into(),
            reader: Arc::downgrade(reader),
            registry: Arc::downgrade(registry),
            context,
            handler: Arc::new(handler),
            deps: Mutex::new(DependencySet::Unknown),
            read_lock: Mutex::new(()),
            // The initial read is pending from the start.
            dirty: AtomicBool::new(true),
            cancelled: AtomicBool::new(false),
            tracer: registry.tracer().clone(),
        });
        registry.subscribe(watcher.clone() as Arc<dyn ChangeObserver>);
        let scheduled = watcher.clone();
        watcher
            .context
            .execute(Box::new(move || scheduled.refresh()));
        watcher
    }

    /// The root key this watcher projects from.
    pub fn root_key(&self) -> &RecordKey {
        &self.root_key
    }

    /// The registry identity of this watcher.
    pub fn observer_id(&self) -> ObserverId {
        self.id
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Unsubscribe and make the watcher permanently inert.
    ///
    /// Idempotent and callable from any thread; never fails, even when the
    /// registry is already gone. No new read starts after this returns. A
    /// read already in flight may still complete and deliver one final
    /// result, best-effort.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.unsubscribe(self.id);
        }
        self.tracer.on_cancel(self.id);
    }

    /// Perform one read if a change is still pending, then dispatch the
    /// result. Runs on the execution context.
    fn refresh(&self) {
        if self.cancelled.load(Ordering::Acquire) {
            self.tracer
                .on_refresh(self.id, &self.root_key, RefreshOutcome::Cancelled);
            return;
        }
        let _serialized = self.read_lock.lock();
        if !self.dirty.swap(false, Ordering::AcqRel) {
            self.tracer
                .on_refresh(self.id, &self.root_key, RefreshOutcome::Coalesced);
            return;
        }
        let Some(reader) = self.reader.upgrade() else {
            self.tracer
                .on_refresh(self.id, &self.root_key, RefreshOutcome::UpstreamGone);
            return;
        };
        match reader.read(&self.root_key) {
            Ok(projection) => {
                let dependencies = projection.touched.len();
                *self.deps.lock() = DependencySet::known(projection.touched);
                self.tracer.on_refresh(
                    self.id,
                    &self.root_key,
                    RefreshOutcome::Delivered { dependencies },
                );
                self.deliver(Ok(projection.value));
            }
            Err(error) => {
                // The snapshot stays as it was: unestablished before the
                // first success, the last good set afterwards, so a later
                // overlapping broadcast retries the read.
                self.tracer
                    .on_refresh(self.id, &self.root_key, RefreshOutcome::Failed);
                self.deliver(Err(error));
            }
        }
    }

    /// Dispatch one result onto the execution context.
    ///
    /// Always a separate task, even when already running on the context:
    /// deliveries are enqueued under the read lock, which pins delivery
    /// order to read-completion order.
    fn deliver(&self, result: WatchResult<R::Value>) {
        let handler = self.handler.clone();
        self.context.execute(Box::new(move || handler(result)));
    }
}

impl<R: StoreReader> ChangeObserver for Watcher<R> {
    fn observer_id(&self) -> ObserverId {
        self.id
    }

    fn on_change(&self, changed: &KeySet, _origin: Option<&OriginId>) {
        if self.cancelled.load(Ordering::Acquire) {
            return;
        }
        let decision = {
            let deps = self.deps.lock();
            if deps.is_unknown() {
                MatchDecision::Unestablished
            } else if deps.matches(changed) {
                MatchDecision::Matched
            } else {
                MatchDecision::Disjoint
            }
        };
        self.tracer.on_match(self.id, &self.root_key, decision);
        if decision != MatchDecision::Matched {
            return;
        }
        self.dirty.store(true, Ordering::Release);
        if let Some(this) = self.this.upgrade() {
            self.context.execute(Box::new(move || this.refresh()));
        }
    }
}
