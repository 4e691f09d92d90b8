//! Key sets and the per-watcher dependency snapshot.

use std::sync::Arc;

use crate::key::RecordKey;

/// An immutable set of record keys.
///
/// Used both for broadcast batches ("these records changed") and for
/// dependency snapshots ("this read touched these records"). The set is
/// wrapped in `Arc`, so clones are cheap and a published set is never
/// mutated in place; replacing a snapshot means swapping the whole value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet(Arc<ahash::HashSet<RecordKey>>);

impl KeySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `key` is a member.
    pub fn contains(&self, key: &RecordKey) -> bool {
        self.0.contains(key)
    }

    /// Number of keys in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the set has no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the keys.
    pub fn iter(&self) -> impl Iterator<Item = &RecordKey> {
        self.0.iter()
    }

    /// Returns true if the two sets share at least one key.
    ///
    /// Probes with the smaller set against the larger one, so the cost is
    /// proportional to the smaller side.
    pub fn intersects(&self, other: &KeySet) -> bool {
        let (probe, table) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        probe.iter().any(|key| table.contains(key))
    }
}

impl<K: Into<RecordKey>> FromIterator<K> for KeySet {
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        Self(Arc::new(iter.into_iter().map(Into::into).collect()))
    }
}

/// The record keys a watcher's last successful read touched, or `Unknown`
/// when no read has succeeded yet.
///
/// Invariant: while `Unknown`, no change broadcast can match; the watcher
/// has no established dependencies and ignores broadcasts until its first
/// successful read installs a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DependencySet {
    /// No successful read has completed yet.
    #[default]
    Unknown,
    /// The keys touched by the most recent successful read.
    Known(KeySet),
}

impl DependencySet {
    /// Snapshot from the touched keys of a completed read.
    pub fn known(keys: KeySet) -> Self {
        Self::Known(keys)
    }

    /// Returns true if no successful read has completed.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// The current snapshot, if one is established.
    pub fn keys(&self) -> Option<&KeySet> {
        match self {
            Self::Unknown => None,
            Self::Known(keys) => Some(keys),
        }
    }

    /// Returns true if a batch of changed keys overlaps the snapshot.
    ///
    /// `Unknown` never matches anything.
    pub fn matches(&self, changed: &KeySet) -> bool {
        match self {
            Self::Unknown => false,
            Self::Known(keys) => keys.intersects(changed),
        }
    }
}
