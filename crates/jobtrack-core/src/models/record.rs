//! Record model: the shared shape of job applications and recruiter
//! submissions.

use crate::models::status::Status;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

/// The two record flavors. They share one shape and one lifecycle; only the
/// id prefix and the storage namespace differ.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Application,
    Submission,
}

impl RecordKind {
    /// Id prefix, e.g. `app_2026-08-07_1f2e3d4c`.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            RecordKind::Application => "app",
            RecordKind::Submission => "sub",
        }
    }

    /// URL path segment and storage namespace for this flavor.
    pub fn collection(&self) -> &'static str {
        match self {
            RecordKind::Application => "applications",
            RecordKind::Submission => "recruiter-submissions",
        }
    }

    /// Top-level storage directory for this flavor.
    pub fn storage_namespace(&self) -> &'static str {
        match self {
            RecordKind::Application => "applications",
            RecordKind::Submission => "submissions",
        }
    }

    /// Resolve a URL collection segment to a flavor.
    pub fn from_collection(segment: &str) -> Option<RecordKind> {
        match segment {
            "applications" => Some(RecordKind::Application),
            "recruiter-submissions" => Some(RecordKind::Submission),
            _ => None,
        }
    }

    fn from_id_prefix(prefix: &str) -> Option<RecordKind> {
        match prefix {
            "app" => Some(RecordKind::Application),
            "sub" => Some(RecordKind::Submission),
            _ => None,
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RecordKind::Application => write!(f, "application"),
            RecordKind::Submission => write!(f, "submission"),
        }
    }
}

/// Record identifier: `{prefix}_{ISO-date}_{8-hex-suffix}`.
///
/// Assigned exactly once at creation and never recomputed. The embedded date
/// is the creation date; its year determines the storage key, so parsing an
/// id is enough to locate the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "app_2026-08-07_1f2e3d4c")]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh id for `kind` dated `date`.
    pub fn generate(kind: RecordKind, date: NaiveDate) -> Self {
        let suffix: u32 = rand::random();
        RecordId(format!(
            "{}_{}_{:08x}",
            kind.id_prefix(),
            date.format("%Y-%m-%d"),
            suffix
        ))
    }

    /// Parse and validate an id, recovering its flavor and creation date.
    pub fn parse(s: &str) -> Result<RecordId, String> {
        let mut parts = s.splitn(3, '_');
        let prefix = parts.next().unwrap_or_default();
        let date_part = parts.next().unwrap_or_default();
        let suffix = parts.next().unwrap_or_default();

        if RecordKind::from_id_prefix(prefix).is_none() {
            return Err(format!("Invalid record id prefix: {}", s));
        }
        if NaiveDate::parse_from_str(date_part, "%Y-%m-%d").is_err() {
            return Err(format!("Invalid record id date: {}", s));
        }
        if suffix.len() < 4
            || suffix.len() > 12
            || !suffix.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(format!("Invalid record id suffix: {}", s));
        }

        Ok(RecordId(s.to_string()))
    }

    pub fn kind(&self) -> RecordKind {
        // Validated at construction; default keeps the accessor infallible.
        self.0
            .split('_')
            .next()
            .and_then(RecordKind::from_id_prefix)
            .unwrap_or(RecordKind::Application)
    }

    /// Creation date embedded in the id.
    pub fn date(&self) -> Option<NaiveDate> {
        let date_part = self.0.split('_').nth(1)?;
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }

    /// Creation year, used to namespace the storage key.
    pub fn year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.date().map(|d| d.year())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Closed set of accepted salary currencies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Myr,
    Sgd,
    Usd,
    Eur,
    Gbp,
    Aud,
    Jpy,
    Inr,
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let code = match self {
            Currency::Myr => "MYR",
            Currency::Sgd => "SGD",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Aud => "AUD",
            Currency::Jpy => "JPY",
            Currency::Inr => "INR",
        };
        write!(f, "{}", code)
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MYR" => Ok(Currency::Myr),
            "SGD" => Ok(Currency::Sgd),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "AUD" => Ok(Currency::Aud),
            "JPY" => Ok(Currency::Jpy),
            "INR" => Ok(Currency::Inr),
            other => Err(anyhow::anyhow!("Unknown currency code: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SalaryPeriod {
    #[default]
    Monthly,
    Yearly,
    Hourly,
}

impl FromStr for SalaryPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(SalaryPeriod::Monthly),
            "yearly" => Ok(SalaryPeriod::Yearly),
            "hourly" => Ok(SalaryPeriod::Hourly),
            other => Err(anyhow::anyhow!("Unknown salary period: {}", other)),
        }
    }
}

/// Offered salary range. Both bounds optional; `min <= max` when both present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct SalaryRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
    pub currency: Currency,
    #[serde(default)]
    pub period: SalaryPeriod,
}

/// Who submitted or who is being tracked. `name` and `email` are identity
/// fields, immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Contact {
    pub name: String,
    pub email: String,
    /// Normalized to digits with an optional leading `+`.
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

/// The position being applied for or pitched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Subject {
    pub title: String,
    /// Counterpart organization (hiring company or agency).
    pub organization: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<SalaryRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Attachment slots. Each slot maps to one deterministic object key under the
/// record's prefix and carries the presign constraints for that slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentSlot {
    Cv,
    JobDescription,
}

impl AttachmentSlot {
    pub fn filename(&self) -> &'static str {
        match self {
            AttachmentSlot::Cv => "cv.pdf",
            AttachmentSlot::JobDescription => "job_description.pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        crate::constants::ATTACHMENT_CONTENT_TYPE
    }

    pub fn max_bytes(&self) -> u64 {
        match self {
            AttachmentSlot::Cv => crate::constants::CV_MAX_BYTES,
            AttachmentSlot::JobDescription => crate::constants::JOB_DESCRIPTION_MAX_BYTES,
        }
    }

    pub fn all() -> &'static [AttachmentSlot] {
        &[AttachmentSlot::Cv, AttachmentSlot::JobDescription]
    }
}

impl Display for AttachmentSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AttachmentSlot::Cv => write!(f, "cv"),
            AttachmentSlot::JobDescription => write!(f, "job_description"),
        }
    }
}

impl FromStr for AttachmentSlot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cv" => Ok(AttachmentSlot::Cv),
            "job_description" => Ok(AttachmentSlot::JobDescription),
            other => Err(anyhow::anyhow!("Unknown attachment slot: {}", other)),
        }
    }
}

/// Reference to an externally stored binary. The key may point at an object
/// that was never uploaded; readers treat that as "not yet uploaded", not as
/// an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Attachment {
    pub slot: AttachmentSlot,
    pub key: String,
    pub content_type: String,
    pub max_bytes: u64,
}

/// One status transition. History entries are append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub old_status: Status,
    pub new_status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The atomic unit: one job application or recruiter submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Record {
    pub id: RecordId,
    pub kind: RecordKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: Status,
    pub contact: Contact,
    pub subject: Subject,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Record {
    /// Assemble a fresh record. Attachment references are registered by the
    /// record store, which owns the key layout.
    pub fn new(
        id: RecordId,
        kind: RecordKind,
        contact: Contact,
        subject: Subject,
        now: DateTime<Utc>,
    ) -> Self {
        Record {
            id,
            kind,
            created_at: now,
            updated_at: now,
            status: Status::New,
            contact,
            subject,
            attachments: Vec::new(),
            notes: None,
            history: Vec::new(),
        }
    }

    pub fn attachment(&self, slot: AttachmentSlot) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.slot == slot)
    }

    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            id: self.id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            status: self.status,
            title: self.subject.title.clone(),
            organization: self.subject.organization.clone(),
            salary_max: self.subject.salary.as_ref().and_then(|s| s.max),
            tags: self.subject.tags.clone(),
        }
    }

    /// Public projection: no contact details, notes, history, or storage keys.
    pub fn public_view(&self) -> PublicRecord {
        PublicRecord {
            id: self.id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            status: self.status,
            subject: self.subject.clone(),
            attachments: self.attachments.iter().map(|a| a.slot).collect(),
        }
    }
}

/// Listing projection, one per record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct RecordSummary {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: Status,
    pub title: String,
    pub organization: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// What unauthenticated callers see when fetching one record.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
pub struct PublicRecord {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: Status,
    pub subject: Subject,
    /// Registered attachment slots; presence of a slot does not imply the
    /// binary was uploaded.
    pub attachments: Vec<AttachmentSlot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> Contact {
        Contact {
            name: "Aisyah Rahman".to_string(),
            email: "aisyah@example.com".to_string(),
            phone: "+60123456789".to_string(),
            organization: None,
        }
    }

    fn subject() -> Subject {
        Subject {
            title: "Platform Engineer".to_string(),
            organization: "Acme Sdn Bhd".to_string(),
            salary: Some(SalaryRange {
                min: Some(8000),
                max: Some(11000),
                currency: Currency::Myr,
                period: SalaryPeriod::Monthly,
            }),
            description: None,
            tags: vec!["rust".to_string(), "aws".to_string()],
        }
    }

    #[test]
    fn test_id_generate_and_parse() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let id = RecordId::generate(RecordKind::Application, date);
        let parsed = RecordId::parse(id.as_str()).unwrap();
        assert_eq!(parsed.kind(), RecordKind::Application);
        assert_eq!(parsed.year(), Some(2026));
        assert!(id.as_str().starts_with("app_2026-08-07_"));
    }

    #[test]
    fn test_id_parse_rejects_malformed() {
        assert!(RecordId::parse("app_2026-08-07_zz!!zzzz").is_err());
        assert!(RecordId::parse("job_2026-08-07_1f2e3d4c").is_err());
        assert!(RecordId::parse("app_08-07-2026_1f2e3d4c").is_err());
        assert!(RecordId::parse("app_2026-08-07").is_err());
        assert!(RecordId::parse("").is_err());
    }

    #[test]
    fn test_ids_are_distinct() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let a = RecordId::generate(RecordKind::Submission, date);
        let b = RecordId::generate(RecordKind::Submission, date);
        assert_ne!(a, b);
    }

    #[test]
    fn test_record_serde_round_trip() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let now = Utc::now();
        let record = Record::new(
            RecordId::generate(RecordKind::Application, date),
            RecordKind::Application,
            contact(),
            subject(),
            now,
        );
        let json = serde_json::to_string_pretty(&record).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.created_at, back.updated_at);
        assert_eq!(back.status, Status::New);
        assert!(back.history.is_empty());
    }

    #[test]
    fn test_public_view_omits_contact() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let record = Record::new(
            RecordId::generate(RecordKind::Submission, date),
            RecordKind::Submission,
            contact(),
            subject(),
            Utc::now(),
        );
        let view = record.public_view();
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("contact").is_none());
        assert!(json.get("notes").is_none());
        assert!(json.get("history").is_none());
    }

    #[test]
    fn test_currency_rejects_unknown() {
        assert!("BTC".parse::<Currency>().is_err());
        assert_eq!("myr".parse::<Currency>().unwrap(), Currency::Myr);
    }

    #[test]
    fn test_attachment_slot_limits() {
        assert_eq!(AttachmentSlot::Cv.max_bytes(), 10 * 1024 * 1024);
        assert_eq!(AttachmentSlot::JobDescription.max_bytes(), 5 * 1024 * 1024);
        assert_eq!(AttachmentSlot::Cv.content_type(), "application/pdf");
    }
}
