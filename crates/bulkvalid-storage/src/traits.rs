//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use bulkvalid_core::StorageBackend;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Destination storage for processed files. Keys must not contain `..` or a
/// leading `/`; see the `keys` module for the layout.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` at `storage_key`, replacing any existing object.
    async fn put(&self, storage_key: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Read the object at `storage_key`.
    async fn get(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Check if an object exists at `storage_key`.
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
