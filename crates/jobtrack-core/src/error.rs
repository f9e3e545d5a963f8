//! Error types module
//!
//! All request-handling errors are unified under the `AppError` enum. Each
//! variant carries a machine-readable kind (the `error` field of the response
//! envelope) plus presentation metadata: HTTP status, recoverability, and the
//! level it should be logged at. Validation failures and missing records are
//! normal control flow and are never surfaced as opaque 500s.

use serde::Serialize;
use utoipa::ToSchema;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like rate limiting
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// A single offending field in a rejected payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    /// Dotted path of the field, e.g. `contact.email` or `subject.salary.min`
    pub field: String,
    /// Human-readable reason the field was rejected
    pub reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Metadata for error responses - defines how an error should be presented.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error kind, e.g. "ValidationError"
    fn error_kind(&self) -> &'static str;

    /// Whether this error is recoverable (the caller can fix and retry)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from the internal error message)
    fn client_message(&self) -> String;

    /// Whether internal details must be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Static metadata per variant: (http_status, kind, recoverable, sensitive, log_level).
fn static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::Validation(_) => (400, "ValidationError", true, false, LogLevel::Debug),
        AppError::InvalidInput(_) => (400, "InvalidRequest", true, false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NotFound", true, false, LogLevel::Debug),
        AppError::Unauthorized(_) => (401, "Unauthorized", false, false, LogLevel::Debug),
        AppError::RateLimited { .. } => (429, "RateLimitExceeded", true, false, LogLevel::Warn),
        AppError::Storage(_) => (500, "StorageError", true, true, LogLevel::Error),
        AppError::Internal(_) => (500, "InternalError", false, true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "InternalError", false, true, LogLevel::Error),
    }
}

impl AppError {
    /// Field-level details for validation failures, if any.
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            AppError::Validation(fields) => Some(fields),
            _ => None,
        }
    }

    /// Seconds the caller should wait before retrying, for rate limiting.
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            AppError::RateLimited {
                retry_after_seconds,
            } => Some(*retry_after_seconds),
            _ => None,
        }
    }

    /// Detailed error information including the source chain, for logs.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();
        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        static_metadata(self).0
    }

    fn error_kind(&self) -> &'static str {
        static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(fields) => {
                format!("Validation failed for {} field(s)", fields.len())
            }
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::RateLimited {
                retry_after_seconds,
            } => format!(
                "Too many requests. Retry after {} seconds.",
                retry_after_seconds
            ),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
