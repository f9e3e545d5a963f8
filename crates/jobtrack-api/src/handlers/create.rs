use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::{resolve_collection, UploadGrantView};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use jobtrack_core::models::{AttachmentSlot, RecordId, Status};
use jobtrack_core::validation::{validate_draft, RecordDraft};
use jobtrack_core::AppError;
use jobtrack_storage::StorageError;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateRecordResponse {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: Status,
    /// Grant for the direct CV upload. Absent when the storage backend
    /// cannot presign uploads; the binary can be attached later via the
    /// reissue endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv_upload: Option<UploadGrantView>,
}

/// Create a record from an unauthenticated draft. Rate limited by source IP.
#[utoipa::path(
    post,
    path = "/{collection}",
    tag = "records",
    params(
        ("collection" = String, Path, description = "applications or recruiter-submissions")
    ),
    request_body = RecordDraft,
    responses(
        (status = 201, description = "Record created", body = CreateRecordResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, draft), fields(collection = %collection))]
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    ValidatedJson(draft): ValidatedJson<RecordDraft>,
) -> Result<impl IntoResponse, HttpAppError> {
    let kind = resolve_collection(&collection)?;

    let normalized = validate_draft(draft).map_err(AppError::Validation)?;

    let record = state.store.create(kind, normalized, Utc::now()).await?;

    // Mint the CV upload grant. The reference is already registered on the
    // record, so a caller that never uploads simply leaves it pending.
    let cv_upload = match record.attachment(AttachmentSlot::Cv) {
        Some(attachment) => {
            match state
                .broker
                .issue_upload(
                    &attachment.key,
                    &attachment.content_type,
                    attachment.max_bytes,
                    None,
                )
                .await
            {
                Ok(grant) => Some(UploadGrantView::from(grant)),
                Err(StorageError::Unsupported(reason)) => {
                    tracing::debug!(record_id = %record.id, reason = reason, "Skipping upload grant");
                    None
                }
                Err(e) => return Err(e.into()),
            }
        }
        None => None,
    };

    Ok((
        StatusCode::CREATED,
        Json(CreateRecordResponse {
            id: record.id.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            status: record.status,
            cv_upload,
        }),
    ))
}
