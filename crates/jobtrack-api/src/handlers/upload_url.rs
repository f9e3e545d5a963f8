use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::{resolve_record_id, UploadGrantView};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use jobtrack_core::models::{AttachmentSlot, RecordId};
use jobtrack_core::AppError;
use jobtrack_storage::{keys, StorageError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UploadUrlRequest {
    /// Attachment slot to reissue for; defaults to "cv"
    pub slot: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadUrlResponse {
    pub id: RecordId,
    pub slot: AttachmentSlot,
    #[serde(flatten)]
    pub upload: UploadGrantView,
}

/// Reissue a fresh upload grant for one attachment slot. The previous URL,
/// if any, stays valid until it expires; the storage layer has no way to
/// revoke it.
#[utoipa::path(
    post,
    path = "/{collection}/{id}/cv-upload-url",
    tag = "records",
    params(
        ("collection" = String, Path, description = "applications or recruiter-submissions"),
        ("id" = String, Path, description = "Record id")
    ),
    request_body = UploadUrlRequest,
    responses(
        (status = 200, description = "Fresh upload grant", body = UploadUrlResponse),
        (status = 400, description = "Unknown slot or unsupported backend", body = ErrorResponse),
        (status = 404, description = "Unknown record", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(collection = %collection, record_id = %id))]
pub async fn reissue_upload_url(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
    request: Option<Json<UploadUrlRequest>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (_kind, record_id) = resolve_record_id(&collection, &id)?;

    let slot = match request.and_then(|Json(r)| r.slot) {
        Some(raw) => raw
            .parse::<AttachmentSlot>()
            .map_err(|e| AppError::InvalidInput(e.to_string()))?,
        None => AttachmentSlot::Cv,
    };

    if !state.store.exists(&record_id).await? {
        return Err(HttpAppError(AppError::NotFound(format!(
            "Record not found: {}",
            record_id
        ))));
    }

    let key = keys::attachment_key(&record_id, slot)?;
    let grant = match state
        .broker
        .issue_upload(&key, slot.content_type(), slot.max_bytes(), None)
        .await
    {
        Ok(grant) => grant,
        Err(StorageError::Unsupported(_)) => {
            return Err(HttpAppError(AppError::InvalidInput(
                "Presigned uploads are only available with the S3 storage backend".to_string(),
            )))
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(UploadUrlResponse {
        id: record_id,
        slot,
        upload: UploadGrantView::from(grant),
    }))
}
