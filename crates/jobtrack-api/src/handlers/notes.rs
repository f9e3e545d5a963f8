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
use jobtrack_core::workflow;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct NotesRequest {
    /// Replacement notes text; an empty string clears the notes
    pub notes: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotesResponse {
    pub id: RecordId,
    pub updated: bool,
    pub updated_at: DateTime<Utc>,
}

/// Overwrite the admin notes verbatim. Unlike a status change this leaves no
/// history entry.
#[utoipa::path(
    put,
    path = "/{collection}/{id}/notes",
    tag = "workflow",
    params(
        ("collection" = String, Path, description = "applications or recruiter-submissions"),
        ("id" = String, Path, description = "Record id")
    ),
    request_body = NotesRequest,
    responses(
        (status = 200, description = "Notes replaced", body = NotesResponse),
        (status = 401, description = "Missing admin token", body = ErrorResponse),
        (status = 404, description = "Unknown record", body = ErrorResponse)
    ),
    security(("admin_token" = []))
)]
#[tracing::instrument(skip(state, request), fields(collection = %collection, record_id = %id))]
pub async fn set_notes(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
    _admin: Admin,
    ValidatedJson(request): ValidatedJson<NotesRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (_kind, record_id) = resolve_record_id(&collection, &id)?;

    let mut record = state.store.get(&record_id).await?;
    workflow::set_notes(&mut record, request.notes, Utc::now())?;
    state.store.save(&record).await?;

    Ok(Json(NotesResponse {
        id: record.id,
        updated: true,
        updated_at: record.updated_at,
    }))
}
