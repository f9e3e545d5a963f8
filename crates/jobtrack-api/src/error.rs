//! HTTP error response conversion
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse, HttpAppError>`.
//! Use `AppError` (or types that implement `Into<AppError>`) for errors and `?`
//! so they become `HttpAppError` and render consistently (status, body, logging).

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use jobtrack_core::{AppError, ErrorMetadata, FieldError, LogLevel};
use jobtrack_storage::{RecordStoreError, StorageError};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

/// The error envelope: a machine-readable kind plus a human message, with
/// field details for validation failures and a wait hint for rate limiting.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error kind, e.g. "ValidationError"
    pub error: String,
    /// Human-readable message
    pub message: String,
    /// Per-field reasons for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
    /// Whether the caller can fix the request and retry
    pub recoverable: bool,
    /// Seconds to wait before retrying, for rate limiting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
    /// Internal details, only present outside production for non-sensitive errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse.
/// Necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (type from jobtrack-core).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("Object not found: {}", key)),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::WriteFailed(msg)
            | StorageError::ReadFailed(msg)
            | StorageError::DeleteFailed(msg)
            | StorageError::SignFailed(msg) => AppError::Storage(msg),
            StorageError::Unsupported(msg) => AppError::Internal(msg.to_string()),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}

impl From<RecordStoreError> for HttpAppError {
    fn from(err: RecordStoreError) -> Self {
        let app = match err {
            RecordStoreError::NotFound(id) => {
                AppError::NotFound(format!("Record not found: {}", id))
            }
            RecordStoreError::Corrupt { key, reason } => {
                AppError::Storage(format!("corrupt record object {}: {}", key, reason))
            }
            RecordStoreError::Storage(storage_err) => return storage_err.into(),
        };
        HttpAppError(app)
    }
}

/// Convert JSON body deserialization failures into a 400 with our
/// ErrorResponse format. Unknown fields in a patch land here.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that returns our ErrorResponse format (400 + JSON) on
/// deserialization failure. Use this instead of `Json<T>` so invalid bodies
/// share the API error shape.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let kind = error.error_kind();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, kind = kind, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, kind = kind, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error.detailed_message(), kind = kind, "Request failed");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let is_production = is_production_env();

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Always hide details in production; in non-production, only show
        // them for non-sensitive errors.
        let details = if is_production || app_error.is_sensitive() {
            None
        } else {
            Some(app_error.detailed_message())
        };

        let body = ErrorResponse {
            error: app_error.error_kind().to_string(),
            message: app_error.client_message(),
            fields: app_error.field_errors().map(|f| f.to_vec()),
            recoverable: app_error.is_recoverable(),
            retry_after_seconds: app_error.retry_after_seconds(),
            details,
        };

        let retry_after = app_error.retry_after_seconds();
        let mut response = (status, Json(body)).into_response();
        if let Some(seconds) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert("Retry-After", value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_storage_error_not_found() {
        let storage_err = StorageError::NotFound("applications/2026/x/meta.json".to_string());
        let HttpAppError(app_err) = storage_err.into();
        match app_err {
            AppError::NotFound(msg) => assert!(msg.contains("meta.json")),
            _ => panic!("Expected NotFound variant"),
        }
    }

    #[test]
    fn test_from_record_store_error_not_found() {
        let err = RecordStoreError::NotFound("app_2026-01-01_deadbeef".to_string());
        let HttpAppError(app_err) = err.into();
        assert_eq!(app_err.http_status_code(), 404);
        assert_eq!(app_err.error_kind(), "NotFound");
    }

    #[test]
    fn test_from_storage_error_write_failed_is_storage_kind() {
        let storage_err = StorageError::WriteFailed("timeout".to_string());
        let HttpAppError(app_err) = storage_err.into();
        assert_eq!(app_err.error_kind(), "StorageError");
        assert_eq!(app_err.http_status_code(), 500);
        assert_eq!(app_err.client_message(), "Failed to access storage");
    }

    /// The public error contract: `error` is the machine-readable kind and
    /// `message` the human text.
    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse {
            error: "ValidationError".to_string(),
            message: "Validation failed for 2 field(s)".to_string(),
            fields: Some(vec![FieldError::new("contact.email", "invalid email address")]),
            recoverable: true,
            retry_after_seconds: None,
            details: None,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(
            json.get("error").and_then(|v| v.as_str()),
            Some("ValidationError")
        );
        assert!(json.get("message").and_then(|v| v.as_str()).is_some());
        assert!(json.get("fields").and_then(|v| v.as_array()).is_some());
        assert!(json.get("retry_after_seconds").is_none());
    }
}
