//! Shared key generation for storage backends.
//!
//! Layout, namespaced by flavor and creation year (the year comes from the
//! id's embedded date, so a key is derivable from the id alone):
//!
//! - `applications/2026/app_2026-08-07_1f2e3d4c/meta.json`
//! - `applications/2026/app_2026-08-07_1f2e3d4c/cv.pdf`
//! - `submissions/2026/sub_2026-08-07_9a8b7c6d/meta.json`

use crate::traits::{StorageError, StorageResult};
use jobtrack_core::models::{AttachmentSlot, RecordId, RecordKind};

/// Object name of the record metadata blob.
pub const META_OBJECT: &str = "meta.json";

/// Prefix that holds every record of a flavor.
pub fn kind_prefix(kind: RecordKind) -> String {
    format!("{}/", kind.storage_namespace())
}

/// Prefix of one record's objects: `{namespace}/{year}/{id}/`.
pub fn record_prefix(id: &RecordId) -> StorageResult<String> {
    let year = id
        .year()
        .ok_or_else(|| StorageError::InvalidKey(format!("id has no parsable date: {}", id)))?;
    Ok(format!(
        "{}/{}/{}/",
        id.kind().storage_namespace(),
        year,
        id
    ))
}

/// Key of the record metadata object.
pub fn meta_key(id: &RecordId) -> StorageResult<String> {
    Ok(format!("{}{}", record_prefix(id)?, META_OBJECT))
}

/// Key of one attachment slot's object.
pub fn attachment_key(id: &RecordId, slot: AttachmentSlot) -> StorageResult<String> {
    Ok(format!("{}{}", record_prefix(id)?, slot.filename()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let id = RecordId::parse("app_2026-08-07_1f2e3d4c").unwrap();
        assert_eq!(
            record_prefix(&id).unwrap(),
            "applications/2026/app_2026-08-07_1f2e3d4c/"
        );
        assert_eq!(
            meta_key(&id).unwrap(),
            "applications/2026/app_2026-08-07_1f2e3d4c/meta.json"
        );
        assert_eq!(
            attachment_key(&id, AttachmentSlot::Cv).unwrap(),
            "applications/2026/app_2026-08-07_1f2e3d4c/cv.pdf"
        );
    }

    #[test]
    fn test_submission_namespace() {
        let id = RecordId::parse("sub_2025-12-31_00ff00ff").unwrap();
        assert_eq!(
            meta_key(&id).unwrap(),
            "submissions/2025/sub_2025-12-31_00ff00ff/meta.json"
        );
        assert_eq!(kind_prefix(RecordKind::Submission), "submissions/");
    }
}
