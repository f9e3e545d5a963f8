//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must
//! implement. Operations are object-granular: a write either fully commits
//! or fails, and absence is reported as `NotFound`, never folded into I/O
//! failures.

use async_trait::async_trait;
use bytes::Bytes;
use jobtrack_core::StorageBackend;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Presigning failed: {0}")]
    SignFailed(String),

    #[error("Operation not supported by this backend: {0}")]
    Unsupported(&'static str),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait so
/// the record store and transfer broker can work against either.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write an object. Atomic at object granularity: concurrent writers to
    /// the same key race and the last write wins.
    async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// Read an object. Absence is `StorageError::NotFound`.
    async fn get_object(&self, key: &str) -> StorageResult<Bytes>;

    /// Delete a single object. Deleting a missing object is not an error.
    async fn delete_object(&self, key: &str) -> StorageResult<()>;

    /// Check whether an object exists without fetching it.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// List object keys under a prefix. Ordering is backend-native and not
    /// guaranteed chronological.
    async fn list_keys(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Delete every object under a prefix, returning how many objects were
    /// removed so callers can detect partial deletion.
    async fn delete_prefix(&self, prefix: &str) -> StorageResult<usize>;

    /// Generate a presigned GET URL for direct download of one object.
    async fn signed_download_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Generate a presigned PUT URL for direct upload to one object. The
    /// content type and length are signed into the request, so the storage
    /// layer rejects uploads that deviate from them. Only supported by S3
    /// backends; others return `StorageError::Unsupported`.
    async fn signed_upload_url(
        &self,
        key: &str,
        content_type: &str,
        content_length: u64,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
