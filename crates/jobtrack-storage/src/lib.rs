//! Jobtrack Storage Library
//!
//! Storage abstraction and implementations for the tracker: the `Storage`
//! trait with S3 and local-filesystem backends, the record store that maps
//! records onto JSON objects in the bucket, and the transfer broker that
//! issues presigned upload/download grants.
//!
//! # Storage key format
//!
//! One JSON object per record, namespaced by flavor and creation year:
//!
//! - Record metadata: `{applications|submissions}/{year}/{id}/meta.json`
//! - Attachments: sibling objects under the same `{...}/{id}/` prefix
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized
//! in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod records;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;
pub mod transfer;

// Re-export commonly used types
pub use factory::create_storage;
pub use jobtrack_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use records::{RecordStore, RecordStoreError, RecordStoreResult};
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use transfer::{DownloadGrant, TransferBroker, UploadGrant};
