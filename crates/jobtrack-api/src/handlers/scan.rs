use crate::auth::Admin;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::resolve_record_id;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use jobtrack_core::filescan::scan_pdf;
use jobtrack_core::models::{AttachmentSlot, RecordId};
use jobtrack_storage::{Storage, StorageError};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Accepted,
    Rejected,
    Missing,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttachmentScanResult {
    pub slot: AttachmentSlot,
    pub status: ScanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScanAttachmentsResponse {
    pub id: RecordId,
    pub results: Vec<AttachmentScanResult>,
    pub accepted: usize,
    pub rejected: usize,
}

/// Scan every uploaded attachment of a record: magic bytes, size, and a
/// pattern sweep for embedded active content. Rejected binaries are deleted
/// from storage; their references stay on the record, reverting the slot to
/// "not yet uploaded".
#[utoipa::path(
    post,
    path = "/{collection}/{id}/scan-attachments",
    tag = "records",
    params(
        ("collection" = String, Path, description = "applications or recruiter-submissions"),
        ("id" = String, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Scan results", body = ScanAttachmentsResponse),
        (status = 401, description = "Missing admin token", body = ErrorResponse),
        (status = 404, description = "Unknown record", body = ErrorResponse)
    ),
    security(("admin_token" = []))
)]
#[tracing::instrument(skip(state), fields(collection = %collection, record_id = %id))]
pub async fn scan_attachments(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
    _admin: Admin,
) -> Result<impl IntoResponse, HttpAppError> {
    let (_kind, record_id) = resolve_record_id(&collection, &id)?;
    let record = state.store.get(&record_id).await?;

    let storage = state.store.storage();
    let mut results = Vec::with_capacity(record.attachments.len());

    for attachment in &record.attachments {
        let data = match storage.get_object(&attachment.key).await {
            Ok(data) => data,
            Err(StorageError::NotFound(_)) => {
                results.push(AttachmentScanResult {
                    slot: attachment.slot,
                    status: ScanStatus::Missing,
                    reason: None,
                });
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        match scan_pdf(&data, attachment.max_bytes) {
            Ok(()) => {
                results.push(AttachmentScanResult {
                    slot: attachment.slot,
                    status: ScanStatus::Accepted,
                    reason: None,
                });
            }
            Err(scan_err) => {
                // Invalid binaries do not stay in the bucket.
                storage.delete_object(&attachment.key).await?;
                tracing::warn!(
                    record_id = %record.id,
                    slot = %attachment.slot,
                    reason = %scan_err,
                    "Deleted invalid attachment"
                );
                results.push(AttachmentScanResult {
                    slot: attachment.slot,
                    status: ScanStatus::Rejected,
                    reason: Some(scan_err.to_string()),
                });
            }
        }
    }

    let accepted = results
        .iter()
        .filter(|r| r.status == ScanStatus::Accepted)
        .count();
    let rejected = results
        .iter()
        .filter(|r| r.status == ScanStatus::Rejected)
        .count();

    Ok(Json(ScanAttachmentsResponse {
        id: record.id,
        results,
        accepted,
        rejected,
    }))
}
