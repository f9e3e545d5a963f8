//! HTTP handlers.

pub mod create;
pub mod delete;
pub mod get;
pub mod health;
pub mod list;
pub mod notes;
pub mod scan;
pub mod status;
pub mod update;
pub mod upload_url;

use crate::error::HttpAppError;
use jobtrack_core::models::{RecordId, RecordKind};
use jobtrack_core::AppError;
use jobtrack_storage::UploadGrant;
use serde::Serialize;
use utoipa::ToSchema;

/// Resolve a URL collection segment (`applications` or
/// `recruiter-submissions`) to a record flavor. Anything else is an unknown
/// endpoint.
pub(crate) fn resolve_collection(collection: &str) -> Result<RecordKind, HttpAppError> {
    RecordKind::from_collection(collection).ok_or_else(|| {
        HttpAppError(AppError::NotFound(format!(
            "Endpoint not found: /{}",
            collection
        )))
    })
}

/// Resolve and validate a record id within its collection. Ids are
/// self-describing, so an application id requested through the submissions
/// collection is treated as absent, not redirected.
pub(crate) fn resolve_record_id(
    collection: &str,
    id: &str,
) -> Result<(RecordKind, RecordId), HttpAppError> {
    let kind = resolve_collection(collection)?;
    let record_id =
        RecordId::parse(id).map_err(|reason| HttpAppError(AppError::InvalidInput(reason)))?;
    if record_id.kind() != kind {
        return Err(HttpAppError(AppError::NotFound(format!(
            "Record not found: {}",
            id
        ))));
    }
    Ok((kind, record_id))
}

/// Serialized upload grant, shared by the create and reissue endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadGrantView {
    /// Presigned PUT URL; possession is the upload capability
    pub url: String,
    /// Content type the URL is bound to
    pub content_type: String,
    /// Maximum accepted upload size in bytes
    pub max_bytes: u64,
    /// Seconds until the URL expires
    pub expires_in_seconds: u64,
}

impl From<UploadGrant> for UploadGrantView {
    fn from(grant: UploadGrant) -> Self {
        UploadGrantView {
            url: grant.url,
            content_type: grant.content_type,
            max_bytes: grant.max_bytes,
            expires_in_seconds: grant.expires_in_seconds,
        }
    }
}
