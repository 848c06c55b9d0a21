//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must
//! implement. Keys follow the scheme in [`crate::keys`].

use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// The ingestion pipeline works against this trait so record persistence is
/// not coupled to a specific backend.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write an object under the given key, returning its public URL.
    async fn put(&self, storage_key: &str, data: Vec<u8>) -> StorageResult<String>;

    /// Read an object by its storage key.
    async fn get(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete an object by its storage key. Deleting a missing object is not
    /// an error; the inconsistency is logged by the backend.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if an object exists.
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;
}
