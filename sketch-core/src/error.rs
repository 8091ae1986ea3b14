//! Error types for editor operations.

use thiserror::Error;

/// Result type for editor operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Result type for key/value storage backends.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in editor operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Object not found in scene.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Invalid operation on the scene or an object.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Viewport transform was rejected.
    #[error("Invalid viewport transform: {0}")]
    InvalidViewport(String),

    /// Scene serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Durable storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors raised by a [`KeyValueStore`](crate::storage::KeyValueStore).
#[derive(Debug, Error)]
pub enum StorageError {
    /// The write would exceed the store's capacity.
    #[error("Quota exceeded: needed {needed} bytes, quota is {quota}")]
    QuotaExceeded {
        /// Bytes the store would hold after the write.
        needed: usize,
        /// Maximum number of bytes the store accepts.
        quota: usize,
    },

    /// An I/O error occurred in a filesystem-backed store.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing store is missing or refused the request.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
