use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::resolve_collection;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use jobtrack_core::constants::{LIST_DEFAULT_LIMIT, LIST_MAX_LIMIT};
use jobtrack_core::models::{RecordSummary, Status};
use jobtrack_core::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Only return records in this status
    pub status: Option<String>,
    /// Maximum number of records to return (default 100, capped at 1000)
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListFilters {
    pub status: Option<Status>,
    pub limit: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListRecordsResponse {
    pub records: Vec<RecordSummary>,
    pub count: usize,
    pub filters: ListFilters,
}

/// List record summaries, newest first.
#[utoipa::path(
    get,
    path = "/{collection}",
    tag = "records",
    params(
        ("collection" = String, Path, description = "applications or recruiter-submissions"),
        ListQuery
    ),
    responses(
        (status = 200, description = "Record summaries", body = ListRecordsResponse),
        (status = 400, description = "Unknown status filter", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(collection = %collection))]
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let kind = resolve_collection(&collection)?;

    let status = match &query.status {
        Some(raw) => Some(
            raw.parse::<Status>()
                .map_err(|e| AppError::InvalidInput(e.to_string()))?,
        ),
        None => None,
    };
    let limit = query.limit.unwrap_or(LIST_DEFAULT_LIMIT).min(LIST_MAX_LIMIT);

    let mut records = state.store.list(kind, status, limit).await?;

    // Store ordering is storage-native; present newest first.
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(ListRecordsResponse {
        count: records.len(),
        records,
        filters: ListFilters { status, limit },
    }))
}
