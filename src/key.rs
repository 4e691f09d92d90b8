//! Identifier types for records and write transactions.

use std::fmt;
use std::sync::Arc;

/// Opaque identifier of one normalized cache record.
///
/// The engine assumes no internal structure: keys are only hashed and
/// compared for equality. The payload is shared, so cloning a key is
/// pointer-sized no matter how long the underlying string is.
///
/// # Examples
///
/// ```
/// # use record_flow::RecordKey;
/// let a = RecordKey::from("Author.5");
/// let b = RecordKey::from("Author.5".to_string());
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "Author.5");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey(Arc<str>);

impl RecordKey {
    /// View the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordKey {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for RecordKey {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl fmt::Debug for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque token correlating a broadcast with the write transaction that
/// committed it.
///
/// The engine threads this token through to observers unchanged; observers
/// are free to ignore it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OriginId(Arc<str>);

impl OriginId {
    /// View the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OriginId {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for OriginId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl fmt::Debug for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
