//! Storage abstraction trait
//!
//! This module defines the trait that all photo storage backends must
//! implement, plus the storage error taxonomy.

use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Opaque object store: put bytes under a key, delete by key.
///
/// The upload orchestrator works against this trait without coupling to any
/// backend's wire protocol. `put` returns the publicly accessible URL of the
/// stored object.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under `storage_key` and return its public URL.
    async fn put(&self, storage_key: &str, content_type: &str, data: Vec<u8>)
        -> StorageResult<String>;

    /// Delete the object at `storage_key`. Deleting a missing object is not
    /// an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check whether an object exists at `storage_key`.
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;
}
