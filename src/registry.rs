//! Subscription registry and broadcast fan-out.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use papaya::HashMap;

use crate::deps::KeySet;
use crate::key::OriginId;
use crate::tracer::{NoopTracer, Tracer};

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a subscribed observer.
///
/// Ids are allocated from a monotonic counter and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Allocate the next process-unique id.
    pub fn next() -> Self {
        Self(NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Capability interface for receiving change broadcasts.
///
/// Implementations are registered with the [`Registry`] by identity and
/// receive every committed batch of changed keys until unsubscribed.
pub trait ChangeObserver: Send + Sync + 'static {
    /// The identity this observer is registered under.
    fn observer_id(&self) -> ObserverId;

    /// A committed batch of writes touched `changed`.
    ///
    /// `origin` is an opaque correlation token identifying the committing
    /// transaction; observers may ignore it. Implementations must not
    /// propagate failures out of this call; a failing observer turns its
    /// failure into a delivery on its own context instead.
    fn on_change(&self, changed: &KeySet, origin: Option<&OriginId>);
}

/// The subscription registry: membership plus broadcast fan-out.
///
/// The registry holds a strong reference to each subscribed observer so it
/// can always deliver. The flip side is caller-controlled lifetime: an
/// observer that is never unsubscribed stays registered (and alive)
/// indefinitely. See [`Watcher::cancel`](crate::Watcher::cancel).
pub struct Registry {
    observers: HashMap<ObserverId, Arc<dyn ChangeObserver>, ahash::RandomState>,
    tracer: Arc<dyn Tracer>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for customizing the registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Register an observer.
    ///
    /// The observer receives every batch broadcast after this call returns.
    pub fn subscribe(&self, observer: Arc<dyn ChangeObserver>) {
        let id = observer.observer_id();
        self.observers.pin().insert(id, observer);
        self.tracer.on_subscribe(id);
    }

    /// Remove an observer. Idempotent; unknown ids are ignored.
    ///
    /// After this call returns, no new broadcast reaches the observer. A
    /// broadcast already fanning out on another thread may still deliver
    /// one final notification.
    pub fn unsubscribe(&self, id: ObserverId) {
        if self.observers.pin().remove(&id).is_some() {
            self.tracer.on_unsubscribe(id);
        }
    }

    /// Returns true if `id` is currently subscribed.
    pub fn is_subscribed(&self, id: ObserverId) -> bool {
        self.observers.pin().contains_key(&id)
    }

    /// Number of currently subscribed observers.
    pub fn observer_count(&self) -> usize {
        self.observers.pin().len()
    }

    /// Fan a committed batch out to every subscribed observer.
    ///
    /// Observers are notified on the calling thread. Per-observer ordering
    /// follows the caller's commit order; callers committing from multiple
    /// threads are responsible for serializing their commits. Empty batches
    /// are dropped without touching observers.
    pub fn broadcast(&self, changed: &KeySet, origin: Option<&OriginId>) {
        if changed.is_empty() {
            return;
        }
        self.tracer.on_broadcast(changed, origin);
        for observer in self.observers.pin().values() {
            observer.on_change(changed, origin);
        }
    }

    pub(crate) fn tracer(&self) -> &Arc<dyn Tracer> {
        &self.tracer
    }
}

/// Builder for customizing a [`Registry`].
///
/// # Example
///
/// ```ignore
/// let registry = Registry::builder()
///     .tracer(Arc::new(MyTracer::default()))
///     .build();
/// ```
pub struct RegistryBuilder {
    tracer: Arc<dyn Tracer>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            tracer: Arc::new(NoopTracer),
        }
    }

    /// Install a tracer. Watchers created against the built registry
    /// report their activity through it.
    pub fn tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = tracer;
        self
    }

    /// Build the registry.
    pub fn build(self) -> Registry {
        Registry {
            observers: HashMap::with_hasher(ahash::RandomState::new()),
            tracer: self.tracer,
        }
    }
}
