use crate::auth::MaybeAdmin;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::resolve_record_id;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use jobtrack_core::models::{AttachmentSlot, PublicRecord, Record};
use jobtrack_storage::Storage;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct AttachmentDownloadView {
    pub slot: AttachmentSlot,
    /// Whether the binary is actually present in storage. A registered
    /// reference without a binary means the upload is still pending.
    pub uploaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_seconds: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminRecordResponse {
    #[serde(flatten)]
    pub record: Record,
    pub downloads: Vec<AttachmentDownloadView>,
}

/// Fetch one record. Unauthenticated callers get the public projection;
/// admins get the full record plus download grants for uploaded attachments.
#[utoipa::path(
    get,
    path = "/{collection}/{id}",
    tag = "records",
    params(
        ("collection" = String, Path, description = "applications or recruiter-submissions"),
        ("id" = String, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "The record", body = AdminRecordResponse),
        (status = 404, description = "Unknown record", body = ErrorResponse)
    ),
    security(("admin_token" = []))
)]
#[tracing::instrument(skip(state, admin), fields(collection = %collection, record_id = %id))]
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
    admin: MaybeAdmin,
) -> Result<Response, HttpAppError> {
    let (_kind, record_id) = resolve_record_id(&collection, &id)?;
    let record = state.store.get(&record_id).await?;

    if !admin.0 {
        let view: PublicRecord = record.public_view();
        return Ok(Json(view).into_response());
    }

    let mut downloads = Vec::with_capacity(record.attachments.len());
    for attachment in &record.attachments {
        let uploaded = state.store.storage().exists(&attachment.key).await?;
        let grant = if uploaded {
            Some(state.broker.issue_download(&attachment.key, None).await?)
        } else {
            None
        };
        downloads.push(AttachmentDownloadView {
            slot: attachment.slot,
            uploaded,
            download_url: grant.as_ref().map(|g| g.url.clone()),
            expires_in_seconds: grant.as_ref().map(|g| g.expires_in_seconds),
        });
    }

    Ok(Json(AdminRecordResponse { record, downloads }).into_response())
}
