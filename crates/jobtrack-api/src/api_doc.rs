//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "jobtrack API",
        description = "Job application and recruiter submission tracker over object storage."
    ),
    paths(
        crate::handlers::create::create_record,
        crate::handlers::list::list_records,
        crate::handlers::get::get_record,
        crate::handlers::update::update_record,
        crate::handlers::delete::delete_record,
        crate::handlers::status::change_status,
        crate::handlers::notes::set_notes,
        crate::handlers::scan::scan_attachments,
        crate::handlers::upload_url::reissue_upload_url,
        crate::handlers::health::health,
    ),
    components(schemas(
        crate::error::ErrorResponse,
        crate::handlers::UploadGrantView,
        crate::handlers::create::CreateRecordResponse,
        crate::handlers::list::ListFilters,
        crate::handlers::list::ListRecordsResponse,
        crate::handlers::get::AttachmentDownloadView,
        crate::handlers::get::AdminRecordResponse,
        crate::handlers::update::UpdateRecordResponse,
        crate::handlers::delete::DeleteRecordResponse,
        crate::handlers::status::StatusChangeRequest,
        crate::handlers::status::StatusChangeResponse,
        crate::handlers::notes::NotesRequest,
        crate::handlers::notes::NotesResponse,
        crate::handlers::scan::AttachmentScanResult,
        crate::handlers::scan::ScanAttachmentsResponse,
        crate::handlers::scan::ScanStatus,
        crate::handlers::upload_url::UploadUrlRequest,
        crate::handlers::upload_url::UploadUrlResponse,
        crate::handlers::health::HealthResponse,
        jobtrack_core::error::FieldError,
        jobtrack_core::models::Attachment,
        jobtrack_core::models::AttachmentSlot,
        jobtrack_core::models::Contact,
        jobtrack_core::models::Currency,
        jobtrack_core::models::HistoryEntry,
        jobtrack_core::models::PublicRecord,
        jobtrack_core::models::Record,
        jobtrack_core::models::RecordId,
        jobtrack_core::models::RecordKind,
        jobtrack_core::models::RecordSummary,
        jobtrack_core::models::SalaryPeriod,
        jobtrack_core::models::SalaryRange,
        jobtrack_core::models::Status,
        jobtrack_core::models::Subject,
        jobtrack_core::validation::ContactDraft,
        jobtrack_core::validation::ContactPatch,
        jobtrack_core::validation::RecordDraft,
        jobtrack_core::validation::RecordPatch,
        jobtrack_core::validation::SalaryDraft,
        jobtrack_core::validation::SubjectDraft,
        jobtrack_core::validation::SubjectPatch,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "records", description = "Record CRUD and presigned transfers"),
        (name = "workflow", description = "Status lifecycle and notes"),
        (name = "meta", description = "Service endpoints")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .build(),
                ),
            );
        }
    }
}
