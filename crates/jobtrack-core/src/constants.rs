//! Shared limits and fixed sets.
//!
//! Field length caps mirror what the public creation form accepts; attachment
//! limits match the upload validator (CV 10 MiB, job description 5 MiB).

/// Maximum length of a contact or organization name.
pub const MAX_NAME_LEN: u64 = 120;

/// Maximum length of a position title.
pub const MAX_TITLE_LEN: u64 = 160;

/// Maximum length of the free-text requirements/description field.
pub const MAX_DESCRIPTION_LEN: u64 = 4000;

/// Maximum length of a normalized phone number.
pub const MAX_PHONE_LEN: u64 = 32;

/// Minimum number of digits a phone number must contain.
pub const MIN_PHONE_DIGITS: usize = 6;

/// Maximum number of tags per record.
pub const MAX_TAGS: usize = 16;

/// Maximum length of a single tag.
pub const MAX_TAG_LEN: usize = 40;

/// Maximum length of a status-transition note.
pub const MAX_TRANSITION_NOTE_LEN: usize = 2000;

/// Maximum length of the admin notes field.
pub const MAX_NOTES_LEN: usize = 8000;

/// Closed set of accepted salary currency codes. Unknown codes are rejected,
/// never coerced.
pub const ALLOWED_CURRENCIES: &[&str] = &[
    "MYR", "SGD", "USD", "EUR", "GBP", "AUD", "JPY", "INR",
];

/// Accepted salary periods.
pub const ALLOWED_SALARY_PERIODS: &[&str] = &["monthly", "yearly", "hourly"];

/// Content type every attachment upload is constrained to.
pub const ATTACHMENT_CONTENT_TYPE: &str = "application/pdf";

/// Maximum CV upload size in bytes (10 MiB).
pub const CV_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Maximum job-description upload size in bytes (5 MiB).
pub const JOB_DESCRIPTION_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// Default presigned URL lifetime in seconds.
pub const PRESIGNED_TTL_DEFAULT_SECS: u64 = 900;

/// Presigned URL lifetime bounds in seconds.
pub const PRESIGNED_TTL_MIN_SECS: u64 = 60;
pub const PRESIGNED_TTL_MAX_SECS: u64 = 900;

/// Listing defaults.
pub const LIST_DEFAULT_LIMIT: usize = 100;
pub const LIST_MAX_LIMIT: usize = 1000;

/// Rate limiter defaults: 5 admissions per 5 minutes per source IP.
pub const RATE_LIMIT_DEFAULT_QUOTA: u32 = 5;
pub const RATE_LIMIT_DEFAULT_WINDOW_SECS: u64 = 300;
