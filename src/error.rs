//! Error types for cache operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing cache files
#[derive(Debug, Error)]
pub enum CacheError {
    /// A filesystem operation on a cache path failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The value could not be converted to JSON
    #[error("Failed to serialize cache value: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The record on disk is not a valid cache envelope
    #[error("Corrupt cache record at {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mentions_path() {
        let err = CacheError::io(
            "/tmp/cache/abc",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/cache/abc"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_serialize_error_converts_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CacheError = json_err.into();
        assert!(matches!(err, CacheError::Serialize(_)));
    }
}
