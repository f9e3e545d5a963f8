//! Domain models

pub mod record;
pub mod status;

pub use record::{
    Attachment, AttachmentSlot, Contact, Currency, HistoryEntry, PublicRecord, Record, RecordId,
    RecordKind, RecordSummary, SalaryPeriod, SalaryRange, Subject,
};
pub use status::{Status, TransitionPolicy};
