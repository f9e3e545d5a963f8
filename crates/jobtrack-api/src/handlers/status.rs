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
use jobtrack_core::models::{RecordId, Status};
use jobtrack_core::{workflow, AppError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct StatusChangeRequest {
    /// Target status, e.g. "contacted"
    pub status: String,
    /// Optional note recorded on the history entry
    pub note: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusChangeResponse {
    pub id: RecordId,
    pub status: Status,
    pub updated_at: DateTime<Utc>,
}

/// Transition a record along the status lifecycle, appending one history
/// entry. Whether backward transitions are allowed is configured by
/// `STATUS_TRANSITION_POLICY`.
#[utoipa::path(
    put,
    path = "/{collection}/{id}/status",
    tag = "workflow",
    params(
        ("collection" = String, Path, description = "applications or recruiter-submissions"),
        ("id" = String, Path, description = "Record id")
    ),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Status changed", body = StatusChangeResponse),
        (status = 400, description = "Illegal transition", body = ErrorResponse),
        (status = 401, description = "Missing admin token", body = ErrorResponse),
        (status = 404, description = "Unknown record", body = ErrorResponse)
    ),
    security(("admin_token" = []))
)]
#[tracing::instrument(skip(state, request), fields(collection = %collection, record_id = %id))]
pub async fn change_status(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
    _admin: Admin,
    ValidatedJson(request): ValidatedJson<StatusChangeRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (_kind, record_id) = resolve_record_id(&collection, &id)?;

    let new_status = request
        .status
        .parse::<Status>()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let mut record = state.store.get(&record_id).await?;
    workflow::transition(
        &mut record,
        new_status,
        request.note,
        state.config.transition_policy,
        Utc::now(),
    )?;
    state.store.save(&record).await?;

    tracing::info!(
        record_id = %record.id,
        status = %record.status,
        "Status transition applied"
    );

    Ok(Json(StatusChangeResponse {
        id: record.id,
        status: record.status,
        updated_at: record.updated_at,
    }))
}
