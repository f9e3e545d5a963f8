//! Payload validation.
//!
//! Inbound payloads are deserialized into loose draft types (strings and raw
//! integers) so a single malformed field cannot mask the rest, then checked
//! with `validator` and custom validators. Every offending field is reported
//! as a `(field, reason)` pair; nothing is silently truncated or coerced.

mod draft;
mod patch;
mod sanitize;

pub use draft::{
    validate_draft, ContactDraft, NormalizedDraft, RecordDraft, SalaryDraft, SubjectDraft,
};
pub use patch::{validate_patch, ContactPatch, NormalizedPatch, RecordPatch, SubjectPatch};
pub use sanitize::{normalize_phone, strip_control_chars};

use crate::error::FieldError;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Flatten nested `ValidationErrors` into dotted-path field errors, sorted by
/// field for deterministic output.
pub(crate) fn flatten_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect_errors("", errors, &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field).then(a.reason.cmp(&b.reason)));
    out
}

fn collect_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = join_path(prefix, field);
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for err in field_errors {
                    let reason = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    out.push(FieldError::new(path.clone(), reason));
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_errors(&path, nested, out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_errors(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    // Schema-level errors are reported against the struct itself.
    if field == "__all__" {
        return if prefix.is_empty() {
            "payload".to_string()
        } else {
            prefix.to_string()
        };
    }
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
