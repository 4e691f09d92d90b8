//! Tracer trait for observing engine activity.
//!
//! This module defines the [`Tracer`] trait and related types for observing
//! subscription, matching, and refresh activity. The default [`NoopTracer`]
//! provides zero cost when tracing is not needed.
//!
//! Implementations can collect events for testing, forward to the `tracing`
//! crate, or provide custom observability.

use crate::deps::KeySet;
use crate::key::{OriginId, RecordKey};
use crate::registry::ObserverId;

/// Why a broadcast did or did not wake a watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchDecision {
    /// No successful read has completed; there is nothing to match against.
    Unestablished,
    /// The changed keys do not overlap the watcher's dependency set.
    Disjoint,
    /// At least one changed key overlaps; a refresh is scheduled.
    Matched,
}

/// How a scheduled refresh ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The read succeeded and the result was dispatched for delivery.
    Delivered {
        /// Number of keys in the new dependency set.
        dependencies: usize,
    },
    /// The read failed and the failure was dispatched for delivery.
    Failed,
    /// An earlier refresh already covered the pending change.
    Coalesced,
    /// The watcher was cancelled before the read started.
    Cancelled,
    /// The upstream reader is gone; nothing was read or delivered.
    UpstreamGone,
}

/// Hooks for observing engine activity.
///
/// All methods have default empty implementations, so an implementation
/// only overrides the events it is interested in.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; hooks may fire from the
/// registry's notifying threads and from execution-context workers
/// concurrently.
pub trait Tracer: Send + Sync + 'static {
    /// An observer joined the registry.
    fn on_subscribe(&self, observer: ObserverId) {
        let _ = observer;
    }

    /// An observer left the registry.
    fn on_unsubscribe(&self, observer: ObserverId) {
        let _ = observer;
    }

    /// A committed batch is about to fan out to subscribed observers.
    fn on_broadcast(&self, changed: &KeySet, origin: Option<&OriginId>) {
        let _ = (changed, origin);
    }

    /// A watcher matched a batch against its dependency set.
    fn on_match(&self, observer: ObserverId, root_key: &RecordKey, decision: MatchDecision) {
        let _ = (observer, root_key, decision);
    }

    /// A scheduled refresh finished.
    fn on_refresh(&self, observer: ObserverId, root_key: &RecordKey, outcome: RefreshOutcome) {
        let _ = (observer, root_key, outcome);
    }

    /// A watcher was cancelled.
    fn on_cancel(&self, observer: ObserverId) {
        let _ = observer;
    }
}

/// Tracer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {}
