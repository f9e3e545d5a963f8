//! Creation drafts and their validation.

use crate::constants::{
    ALLOWED_CURRENCIES, ALLOWED_SALARY_PERIODS, MAX_PHONE_LEN, MAX_TAGS, MAX_TAG_LEN,
    MIN_PHONE_DIGITS,
};
use crate::error::FieldError;
use crate::models::{Contact, Currency, SalaryPeriod, SalaryRange, Subject};
use crate::validation::sanitize::{normalize_phone, strip_control_chars};
use serde::Deserialize;
use std::sync::OnceLock;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Raw creation payload. Strings and integers only, so every field can be
/// checked and reported independently.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RecordDraft {
    #[validate(nested)]
    pub contact: ContactDraft,
    #[validate(nested)]
    pub subject: SubjectDraft,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ContactDraft {
    #[validate(length(min = 1, max = 120, message = "must be between 1 and 120 characters"))]
    pub name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(custom(function = validate_phone))]
    pub phone: String,
    #[validate(length(min = 1, max = 120, message = "must be between 1 and 120 characters"))]
    pub organization: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SubjectDraft {
    #[validate(length(min = 1, max = 160, message = "must be between 1 and 160 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 120, message = "must be between 1 and 120 characters"))]
    pub organization: String,
    #[validate(nested)]
    pub salary: Option<SalaryDraft>,
    #[validate(length(max = 4000, message = "must be at most 4000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(custom(function = validate_tags))]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = validate_salary_bounds, skip_on_field_errors = false))]
pub struct SalaryDraft {
    #[validate(range(min = 0, message = "must be non-negative"))]
    pub min: Option<i64>,
    #[validate(range(min = 0, message = "must be non-negative"))]
    pub max: Option<i64>,
    #[validate(custom(function = validate_currency))]
    pub currency: String,
    #[validate(custom(function = validate_period))]
    pub period: Option<String>,
}

/// A draft that passed validation, with enums parsed and strings normalized.
#[derive(Debug, Clone)]
pub struct NormalizedDraft {
    pub contact: Contact,
    pub subject: Subject,
}

fn phone_regex() -> &'static regex::Regex {
    static PHONE: OnceLock<regex::Regex> = OnceLock::new();
    PHONE.get_or_init(|| {
        regex::Regex::new(r"^\+?[0-9][0-9 ()./\-]*$").expect("phone regex is valid")
    })
}

pub(crate) fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.is_empty() {
        return Err(ValidationError::new("phone").with_message("must not be empty".into()));
    }
    if phone.len() as u64 > MAX_PHONE_LEN {
        return Err(ValidationError::new("phone")
            .with_message(format!("must be at most {} characters", MAX_PHONE_LEN).into()));
    }
    if !phone_regex().is_match(phone) {
        return Err(ValidationError::new("phone")
            .with_message("must contain only digits, spaces, and ()./- punctuation".into()));
    }
    if phone.chars().filter(|c| c.is_ascii_digit()).count() < MIN_PHONE_DIGITS {
        return Err(ValidationError::new("phone")
            .with_message(format!("must contain at least {} digits", MIN_PHONE_DIGITS).into()));
    }
    Ok(())
}

fn validate_currency(currency: &str) -> Result<(), ValidationError> {
    if ALLOWED_CURRENCIES.contains(&currency.to_uppercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("currency").with_message(
            format!(
                "unknown currency code, expected one of: {}",
                ALLOWED_CURRENCIES.join(", ")
            )
            .into(),
        ))
    }
}

fn validate_period(period: &str) -> Result<(), ValidationError> {
    if ALLOWED_SALARY_PERIODS.contains(&period.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("period").with_message(
            format!(
                "unknown salary period, expected one of: {}",
                ALLOWED_SALARY_PERIODS.join(", ")
            )
            .into(),
        ))
    }
}

pub(crate) fn validate_tags(tags: &Vec<String>) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(ValidationError::new("tags")
            .with_message(format!("at most {} tags allowed", MAX_TAGS).into()));
    }
    for tag in tags {
        if tag.is_empty() || tag.len() > MAX_TAG_LEN {
            return Err(ValidationError::new("tags").with_message(
                format!("each tag must be between 1 and {} characters", MAX_TAG_LEN).into(),
            ));
        }
    }
    Ok(())
}

fn validate_salary_bounds(salary: &SalaryDraft) -> Result<(), ValidationError> {
    if let (Some(min), Some(max)) = (salary.min, salary.max) {
        if min > max {
            return Err(
                ValidationError::new("salary").with_message("min must not exceed max".into())
            );
        }
    }
    Ok(())
}

/// Strip control characters from every free-text field before validation.
/// Over-length values still fail validation afterwards; sanitization never
/// truncates.
fn sanitize_draft(draft: &mut RecordDraft) {
    let contact = &mut draft.contact;
    contact.name = strip_control_chars(&contact.name, false);
    contact.email = strip_control_chars(&contact.email, false);
    contact.phone = strip_control_chars(&contact.phone, false);
    if let Some(org) = contact.organization.take() {
        contact.organization = Some(strip_control_chars(&org, false));
    }

    let subject = &mut draft.subject;
    subject.title = strip_control_chars(&subject.title, false);
    subject.organization = strip_control_chars(&subject.organization, false);
    if let Some(desc) = subject.description.take() {
        subject.description = Some(strip_control_chars(&desc, true));
    }
    for tag in &mut subject.tags {
        *tag = strip_control_chars(tag, false);
    }
    if let Some(salary) = &mut draft.subject.salary {
        salary.currency = strip_control_chars(&salary.currency, false);
        if let Some(period) = salary.period.take() {
            salary.period = Some(strip_control_chars(&period, false));
        }
    }
}

pub(crate) fn convert_salary(
    salary: &SalaryDraft,
    prefix: &str,
    errors: &mut Vec<FieldError>,
) -> Option<SalaryRange> {
    let currency = match salary.currency.parse::<Currency>() {
        Ok(c) => c,
        Err(e) => {
            errors.push(FieldError::new(format!("{}.currency", prefix), e.to_string()));
            return None;
        }
    };
    let period = match &salary.period {
        Some(p) => match p.parse::<SalaryPeriod>() {
            Ok(p) => p,
            Err(e) => {
                errors.push(FieldError::new(format!("{}.period", prefix), e.to_string()));
                return None;
            }
        },
        None => SalaryPeriod::default(),
    };
    Some(SalaryRange {
        min: salary.min.map(|v| v as u64),
        max: salary.max.map(|v| v as u64),
        currency,
        period,
    })
}

/// Validate a creation draft, returning either a normalized strongly-typed
/// draft or every offending field. Pure: no I/O, no side effects.
pub fn validate_draft(mut draft: RecordDraft) -> Result<NormalizedDraft, Vec<FieldError>> {
    sanitize_draft(&mut draft);

    let mut errors = match draft.validate() {
        Ok(()) => Vec::new(),
        Err(validation_errors) => crate::validation::flatten_errors(&validation_errors),
    };

    let salary = match &draft.subject.salary {
        Some(salary_draft) if errors.is_empty() => {
            convert_salary(salary_draft, "subject.salary", &mut errors)
        }
        _ => None,
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NormalizedDraft {
        contact: Contact {
            name: draft.contact.name,
            email: draft.contact.email,
            phone: normalize_phone(&draft.contact.phone),
            organization: draft.contact.organization.filter(|o| !o.is_empty()),
        },
        subject: Subject {
            title: draft.subject.title,
            organization: draft.subject.organization,
            salary,
            description: draft.subject.description.filter(|d| !d.is_empty()),
            tags: draft.subject.tags,
        },
    })
}
