//! Error types for read transactions.

use std::fmt;
use std::sync::Arc;

use crate::key::RecordKey;

/// Failure of a read transaction, delivered to the watch handler as a
/// failure result.
///
/// A read error is terminal for that one delivery only: the watcher stays
/// subscribed and reads again on the next relevant change. Projection errors
/// can be propagated from reader implementations with the `?` operator,
/// which converts any `Into<anyhow::Error>` type into
/// `ReadError::Projection`.
#[derive(Debug, Clone)]
pub enum ReadError {
    /// The root key did not resolve to a cached record.
    RootMissing {
        /// The root key that failed to resolve.
        key: RecordKey,
    },

    /// The projection failed while materializing the value.
    ///
    /// Carries the underlying domain error from the reader implementation.
    Projection(Arc<anyhow::Error>),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::RootMissing { key } => {
                write!(f, "root record not found: {}", key)
            }
            ReadError::Projection(e) => write!(f, "projection failed: {}", e),
        }
    }
}

impl<T: Into<anyhow::Error>> From<T> for ReadError {
    fn from(err: T) -> Self {
        ReadError::Projection(Arc::new(err.into()))
    }
}

impl ReadError {
    /// Returns a reference to the inner projection error, if any.
    pub fn projection_error(&self) -> Option<&Arc<anyhow::Error>> {
        match self {
            ReadError::Projection(e) => Some(e),
            _ => None,
        }
    }

    /// Attempts to downcast the projection error to a specific type.
    pub fn downcast_ref<E: std::error::Error + Send + Sync + 'static>(&self) -> Option<&E> {
        self.projection_error().and_then(|e| e.downcast_ref::<E>())
    }

    /// Returns true if the root key failed to resolve.
    pub fn is_root_missing(&self) -> bool {
        matches!(self, ReadError::RootMissing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ReadError = anyhow::Error::from(io_err).into();

        assert!(matches!(err, ReadError::Projection(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_projection_from_anyhow() {
        let err: ReadError = anyhow::anyhow!("selection failed").into();
        assert!(err.to_string().contains("selection failed"));
        assert!(!err.is_root_missing());
    }

    #[test]
    fn test_root_missing_display() {
        let err = ReadError::RootMissing {
            key: RecordKey::from("Query.1"),
        };
        assert!(err.is_root_missing());
        assert_eq!(err.to_string(), "root record not found: Query.1");
    }

    #[derive(Debug, Clone, PartialEq)]
    struct SelectionError {
        field: &'static str,
    }

    impl fmt::Display for SelectionError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "missing field {}", self.field)
        }
    }

    impl std::error::Error for SelectionError {}

    #[test]
    fn test_downcast_projection_error() {
        let err: ReadError = anyhow::Error::from(SelectionError { field: "name" }).into();
        let inner = err.downcast_ref::<SelectionError>();
        assert_eq!(inner, Some(&SelectionError { field: "name" }));
    }
}
