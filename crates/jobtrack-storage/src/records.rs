//! Record store adapter.
//!
//! Maps a logical record onto object storage: one pretty-printed JSON object
//! per record at `{namespace}/{year}/{id}/meta.json`, with attachments as
//! sibling objects. Writes are atomic at object granularity but there is no
//! optimistic concurrency: two concurrent read-modify-write cycles on the
//! same record end last-writer-wins.

use crate::keys;
use crate::traits::{Storage, StorageError};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use jobtrack_core::models::{
    Attachment, AttachmentSlot, Record, RecordId, RecordKind, RecordSummary, Status,
};
use jobtrack_core::validation::{NormalizedDraft, NormalizedPatch};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Corrupt record object {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type RecordStoreResult<T> = Result<T, RecordStoreError>;

const META_CONTENT_TYPE: &str = "application/json";

/// CRUD plus prefix-scoped listing for records.
#[derive(Clone)]
pub struct RecordStore {
    storage: Arc<dyn Storage>,
}

impl RecordStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        RecordStore { storage }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Create a record from a validated draft: assign the id and timestamps,
    /// register the attachment references, and write the metadata object.
    /// The attachment binaries are uploaded later through presigned URLs; a
    /// registered reference with no object behind it means "not yet
    /// uploaded".
    pub async fn create(
        &self,
        kind: RecordKind,
        draft: NormalizedDraft,
        now: DateTime<Utc>,
    ) -> RecordStoreResult<Record> {
        let id = RecordId::generate(kind, now.date_naive());
        let mut record = Record::new(id, kind, draft.contact, draft.subject, now);

        for slot in AttachmentSlot::all() {
            record.attachments.push(Attachment {
                slot: *slot,
                key: keys::attachment_key(&record.id, *slot)?,
                content_type: slot.content_type().to_string(),
                max_bytes: slot.max_bytes(),
            });
        }

        self.save(&record).await?;

        tracing::info!(record_id = %record.id, kind = %kind, "Record created");
        Ok(record)
    }

    /// Read and deserialize one record. Absence is a first-class outcome.
    pub async fn get(&self, id: &RecordId) -> RecordStoreResult<Record> {
        let key = keys::meta_key(id)?;
        let data = match self.storage.get_object(&key).await {
            Ok(data) => data,
            Err(StorageError::NotFound(_)) => {
                return Err(RecordStoreError::NotFound(id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&data).map_err(|e| RecordStoreError::Corrupt {
            key,
            reason: e.to_string(),
        })
    }

    /// Check for the metadata object without reading it.
    pub async fn exists(&self, id: &RecordId) -> RecordStoreResult<bool> {
        let key = keys::meta_key(id)?;
        Ok(self.storage.exists(&key).await?)
    }

    /// Serialize and write the record's metadata object. Last writer wins;
    /// there is no version token compared at write time.
    pub async fn save(&self, record: &Record) -> RecordStoreResult<()> {
        let key = keys::meta_key(&record.id)?;
        let body = serde_json::to_vec_pretty(record).map_err(|e| RecordStoreError::Corrupt {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        self.storage
            .put_object(&key, Bytes::from(body), META_CONTENT_TYPE)
            .await?;
        Ok(())
    }

    /// Read-modify-write of the whitelisted patch fields, bumping
    /// `updated_at`.
    pub async fn update(
        &self,
        id: &RecordId,
        patch: &NormalizedPatch,
        now: DateTime<Utc>,
    ) -> RecordStoreResult<Record> {
        let mut record = self.get(id).await?;
        patch.apply(&mut record);
        record.updated_at = now;
        self.save(&record).await?;

        tracing::info!(record_id = %id, "Record updated");
        Ok(record)
    }

    /// Remove the record and every attachment object under its prefix,
    /// reporting how many objects were deleted.
    pub async fn delete(&self, id: &RecordId) -> RecordStoreResult<usize> {
        let prefix = keys::record_prefix(id)?;
        let deleted = self.storage.delete_prefix(&prefix).await?;
        if deleted == 0 {
            return Err(RecordStoreError::NotFound(id.to_string()));
        }

        tracing::info!(record_id = %id, objects_deleted = deleted, "Record deleted");
        Ok(deleted)
    }

    /// Scan one flavor's prefix and collect summaries, optionally filtered by
    /// status and truncated to `limit`. Ordering is storage-native; callers
    /// needing a strict order sort the result themselves. Objects that fail
    /// to parse are skipped with a warning rather than failing the listing.
    pub async fn list(
        &self,
        kind: RecordKind,
        status: Option<Status>,
        limit: usize,
    ) -> RecordStoreResult<Vec<RecordSummary>> {
        let prefix = keys::kind_prefix(kind);
        let keys = self.storage.list_keys(&prefix).await?;

        let mut summaries = Vec::new();
        for key in keys {
            if !key.ends_with(keys::META_OBJECT) {
                continue;
            }
            let data = match self.storage.get_object(&key).await {
                Ok(data) => data,
                Err(StorageError::NotFound(_)) => continue, // deleted mid-scan
                Err(e) => return Err(e.into()),
            };
            let record: Record = match serde_json::from_slice(&data) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Skipping unreadable record object");
                    continue;
                }
            };

            if let Some(wanted) = status {
                if record.status != wanted {
                    continue;
                }
            }

            summaries.push(record.summary());
            if summaries.len() >= limit {
                break;
            }
        }

        Ok(summaries)
    }
}
