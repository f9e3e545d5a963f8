use crate::auth::Admin;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::resolve_record_id;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use jobtrack_core::models::RecordId;
use jobtrack_core::validation::{validate_patch, RecordPatch};
use jobtrack_core::AppError;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateRecordResponse {
    pub id: RecordId,
    pub updated: bool,
    pub updated_at: DateTime<Utc>,
}

/// Patch whitelisted fields of a record. Identity fields, status, notes, and
/// history are not patchable here; unknown fields are rejected outright.
/// Concurrent patches are last-writer-wins.
#[utoipa::path(
    put,
    path = "/{collection}/{id}",
    tag = "records",
    params(
        ("collection" = String, Path, description = "applications or recruiter-submissions"),
        ("id" = String, Path, description = "Record id")
    ),
    request_body = RecordPatch,
    responses(
        (status = 200, description = "Record updated", body = UpdateRecordResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Missing admin token", body = ErrorResponse),
        (status = 404, description = "Unknown record", body = ErrorResponse)
    ),
    security(("admin_token" = []))
)]
#[tracing::instrument(skip(state, patch), fields(collection = %collection, record_id = %id))]
pub async fn update_record(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
    _admin: Admin,
    ValidatedJson(patch): ValidatedJson<RecordPatch>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (_kind, record_id) = resolve_record_id(&collection, &id)?;

    let normalized = validate_patch(patch).map_err(AppError::Validation)?;
    if normalized.is_empty() {
        return Err(HttpAppError(AppError::InvalidInput(
            "No patchable fields provided".to_string(),
        )));
    }

    let record = state
        .store
        .update(&record_id, &normalized, Utc::now())
        .await?;

    Ok(Json(UpdateRecordResponse {
        id: record.id,
        updated: true,
        updated_at: record.updated_at,
    }))
}
