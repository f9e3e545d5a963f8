//! Status and notes workflow.
//!
//! Every status change goes through [`transition`], which appends exactly one
//! history entry. Notes are a plain overwrite and leave no history entry.

use crate::constants::{MAX_NOTES_LEN, MAX_TRANSITION_NOTE_LEN};
use crate::error::AppError;
use crate::models::{HistoryEntry, Record, Status, TransitionPolicy};
use crate::validation::strip_control_chars;
use chrono::{DateTime, Utc};

/// Move a record to `new_status`, appending one history entry and bumping
/// `updated_at`. Transitioning to the current status is rejected.
pub fn transition(
    record: &mut Record,
    new_status: Status,
    note: Option<String>,
    policy: TransitionPolicy,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if new_status == record.status {
        return Err(AppError::InvalidInput(format!(
            "Record is already in status '{}'",
            new_status
        )));
    }

    if policy == TransitionPolicy::ForwardOnly && new_status.rank() < record.status.rank() {
        return Err(AppError::InvalidInput(format!(
            "Backward transition '{}' -> '{}' is not allowed",
            record.status, new_status
        )));
    }

    let note = match note {
        Some(text) => {
            let cleaned = strip_control_chars(&text, true);
            if cleaned.len() > MAX_TRANSITION_NOTE_LEN {
                return Err(AppError::InvalidInput(format!(
                    "Transition note must be at most {} characters",
                    MAX_TRANSITION_NOTE_LEN
                )));
            }
            if cleaned.is_empty() {
                None
            } else {
                Some(cleaned)
            }
        }
        None => None,
    };

    record.history.push(HistoryEntry {
        timestamp: now,
        old_status: record.status,
        new_status,
        note,
    });
    record.status = new_status;
    record.updated_at = now;

    Ok(())
}

/// Overwrite the admin notes verbatim. Intentionally not a history event.
pub fn set_notes(record: &mut Record, text: String, now: DateTime<Utc>) -> Result<(), AppError> {
    let cleaned = strip_control_chars(&text, true);
    if cleaned.len() > MAX_NOTES_LEN {
        return Err(AppError::InvalidInput(format!(
            "Notes must be at most {} characters",
            MAX_NOTES_LEN
        )));
    }

    record.notes = if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    };
    record.updated_at = now;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Contact, RecordId, RecordKind, Subject};
    use chrono::NaiveDate;

    fn record() -> Record {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        Record::new(
            RecordId::generate(RecordKind::Application, date),
            RecordKind::Application,
            Contact {
                name: "Aisyah Rahman".to_string(),
                email: "aisyah@example.com".to_string(),
                phone: "+60123456789".to_string(),
                organization: None,
            },
            Subject {
                title: "Platform Engineer".to_string(),
                organization: "Acme Sdn Bhd".to_string(),
                salary: None,
                description: None,
                tags: Vec::new(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_each_transition_appends_exactly_one_entry() {
        let mut record = record();
        let steps = [Status::Contacted, Status::CvSent, Status::Interview, Status::Closed];
        for (i, status) in steps.iter().enumerate() {
            transition(
                &mut record,
                *status,
                Some(format!("step {}", i)),
                TransitionPolicy::Permissive,
                Utc::now(),
            )
            .unwrap();
            assert_eq!(record.history.len(), i + 1);
            assert_eq!(record.status, *status);
        }
        // Entries are in transition order and chain old -> new.
        for pair in record.history.windows(2) {
            assert_eq!(pair[0].new_status, pair[1].old_status);
        }
    }

    #[test]
    fn test_same_status_rejected() {
        let mut record = record();
        let err = transition(
            &mut record,
            Status::New,
            None,
            TransitionPolicy::Permissive,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(record.history.is_empty());
    }

    #[test]
    fn test_backward_transition_policy() {
        let mut record = record();
        transition(
            &mut record,
            Status::Closed,
            None,
            TransitionPolicy::Permissive,
            Utc::now(),
        )
        .unwrap();

        // Permissive allows reopening, forward-only does not.
        let mut reopened = record.clone();
        transition(
            &mut reopened,
            Status::New,
            None,
            TransitionPolicy::Permissive,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(reopened.history.len(), 2);

        let err = transition(
            &mut record,
            Status::New,
            None,
            TransitionPolicy::ForwardOnly,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(record.history.len(), 1);
    }

    #[test]
    fn test_lateral_transition_allowed_under_forward_only() {
        let mut record = record();
        transition(
            &mut record,
            Status::CvSent,
            None,
            TransitionPolicy::ForwardOnly,
            Utc::now(),
        )
        .unwrap();
        transition(
            &mut record,
            Status::Interview,
            None,
            TransitionPolicy::ForwardOnly,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(record.status, Status::Interview);
    }

    #[test]
    fn test_transition_bumps_updated_at() {
        let mut record = record();
        let later = record.created_at + chrono::Duration::seconds(90);
        transition(
            &mut record,
            Status::Contacted,
            None,
            TransitionPolicy::Permissive,
            later,
        )
        .unwrap();
        assert_eq!(record.updated_at, later);
        assert!(record.updated_at >= record.created_at);
    }

    #[test]
    fn test_set_notes_overwrites_without_history() {
        let mut record = record();
        set_notes(&mut record, "first pass".to_string(), Utc::now()).unwrap();
        set_notes(&mut record, "second\u{0} pass".to_string(), Utc::now()).unwrap();
        assert_eq!(record.notes.as_deref(), Some("second pass"));
        assert!(record.history.is_empty());

        set_notes(&mut record, String::new(), Utc::now()).unwrap();
        assert_eq!(record.notes, None);
    }

    #[test]
    fn test_note_length_caps() {
        let mut record = record();
        let err = transition(
            &mut record,
            Status::Contacted,
            Some("x".repeat(2001)),
            TransitionPolicy::Permissive,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = set_notes(&mut record, "y".repeat(8001), Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
