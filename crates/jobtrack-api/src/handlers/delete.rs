use crate::auth::Admin;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::resolve_record_id;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use jobtrack_core::models::RecordId;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteRecordResponse {
    pub id: RecordId,
    pub deleted: bool,
    /// Objects removed from storage: the metadata object plus every uploaded
    /// attachment. Lets callers detect partial deletion.
    pub files_deleted: usize,
}

/// Delete a record and every attachment under its prefix.
#[utoipa::path(
    delete,
    path = "/{collection}/{id}",
    tag = "records",
    params(
        ("collection" = String, Path, description = "applications or recruiter-submissions"),
        ("id" = String, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Record deleted", body = DeleteRecordResponse),
        (status = 401, description = "Missing admin token", body = ErrorResponse),
        (status = 404, description = "Unknown record", body = ErrorResponse)
    ),
    security(("admin_token" = []))
)]
#[tracing::instrument(skip(state), fields(collection = %collection, record_id = %id))]
pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
    _admin: Admin,
) -> Result<impl IntoResponse, HttpAppError> {
    let (_kind, record_id) = resolve_record_id(&collection, &id)?;

    let files_deleted = state.store.delete(&record_id).await?;

    Ok(Json(DeleteRecordResponse {
        id: record_id,
        deleted: true,
        files_deleted,
    }))
}
