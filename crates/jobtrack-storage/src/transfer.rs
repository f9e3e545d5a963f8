//! Presigned transfer broker.
//!
//! Issues short-lived, single-object upload and download grants so record
//! binaries never pass through the request-handling tier. Possession of a
//! grant URL is the capability; once issued, a URL cannot be revoked and
//! expires at the storage layer.

use crate::traits::{Storage, StorageResult};
use jobtrack_core::constants::{PRESIGNED_TTL_MAX_SECS, PRESIGNED_TTL_MIN_SECS};
use std::sync::Arc;
use std::time::Duration;

/// Grant for a direct PUT of one object. `content_type` and `max_bytes` are
/// signed into the URL by the S3 backend, so deviating uploads are rejected
/// by storage, not by this service.
#[derive(Debug, Clone)]
pub struct UploadGrant {
    pub url: String,
    pub key: String,
    pub content_type: String,
    pub max_bytes: u64,
    pub expires_in_seconds: u64,
}

/// Grant for a direct GET of one object.
#[derive(Debug, Clone)]
pub struct DownloadGrant {
    pub url: String,
    pub key: String,
    pub expires_in_seconds: u64,
}

#[derive(Clone)]
pub struct TransferBroker {
    storage: Arc<dyn Storage>,
    default_ttl: Duration,
}

impl TransferBroker {
    pub fn new(storage: Arc<dyn Storage>, default_ttl: Duration) -> Self {
        TransferBroker {
            storage,
            default_ttl: clamp_ttl(default_ttl),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue an upload grant scoped to exactly `key`.
    pub async fn issue_upload(
        &self,
        key: &str,
        content_type: &str,
        max_bytes: u64,
        ttl: Option<Duration>,
    ) -> StorageResult<UploadGrant> {
        let ttl = clamp_ttl(ttl.unwrap_or(self.default_ttl));
        let url = self
            .storage
            .signed_upload_url(key, content_type, max_bytes, ttl)
            .await?;

        tracing::debug!(key = %key, ttl_secs = ttl.as_secs(), "Issued upload grant");

        Ok(UploadGrant {
            url,
            key: key.to_string(),
            content_type: content_type.to_string(),
            max_bytes,
            expires_in_seconds: ttl.as_secs(),
        })
    }

    /// Issue a download grant scoped to exactly `key`.
    pub async fn issue_download(
        &self,
        key: &str,
        ttl: Option<Duration>,
    ) -> StorageResult<DownloadGrant> {
        let ttl = clamp_ttl(ttl.unwrap_or(self.default_ttl));
        let url = self.storage.signed_download_url(key, ttl).await?;

        Ok(DownloadGrant {
            url,
            key: key.to_string(),
            expires_in_seconds: ttl.as_secs(),
        })
    }
}

fn clamp_ttl(ttl: Duration) -> Duration {
    Duration::from_secs(
        ttl.as_secs()
            .clamp(PRESIGNED_TTL_MIN_SECS, PRESIGNED_TTL_MAX_SECS),
    )
}
