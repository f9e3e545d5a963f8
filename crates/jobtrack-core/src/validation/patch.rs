//! Update patches.
//!
//! Only whitelisted fields are representable here: identity fields
//! (`contact.name`, `contact.email`), `id`, timestamps, `status`, `notes`,
//! `history`, and attachment keys are not part of the patch shape, and
//! unknown fields are rejected at deserialization.

use crate::error::FieldError;
use crate::models::{Record, SalaryRange};
use crate::validation::draft::{convert_salary, validate_phone, validate_tags, SalaryDraft};
use crate::validation::sanitize::{normalize_phone, strip_control_chars};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RecordPatch {
    #[validate(nested)]
    pub contact: Option<ContactPatch>,
    #[validate(nested)]
    pub subject: Option<SubjectPatch>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ContactPatch {
    #[validate(custom(function = validate_phone))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 120, message = "must be between 1 and 120 characters"))]
    pub organization: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SubjectPatch {
    #[validate(length(min = 1, max = 160, message = "must be between 1 and 160 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 120, message = "must be between 1 and 120 characters"))]
    pub organization: Option<String>,
    #[validate(nested)]
    pub salary: Option<SalaryDraft>,
    #[validate(length(max = 4000, message = "must be at most 4000 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = validate_tags))]
    pub tags: Option<Vec<String>>,
}

/// A validated patch with enums parsed and strings sanitized. Applying it is
/// a plain field-by-field overwrite; the caller owns read-modify-write.
#[derive(Debug, Clone, Default)]
pub struct NormalizedPatch {
    pub contact_phone: Option<String>,
    pub contact_organization: Option<String>,
    pub title: Option<String>,
    pub organization: Option<String>,
    pub salary: Option<SalaryRange>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl NormalizedPatch {
    pub fn is_empty(&self) -> bool {
        self.contact_phone.is_none()
            && self.contact_organization.is_none()
            && self.title.is_none()
            && self.organization.is_none()
            && self.salary.is_none()
            && self.description.is_none()
            && self.tags.is_none()
    }

    /// Overwrite the whitelisted fields that are present. Timestamps are the
    /// caller's responsibility.
    pub fn apply(&self, record: &mut Record) {
        if let Some(phone) = &self.contact_phone {
            record.contact.phone = phone.clone();
        }
        if let Some(org) = &self.contact_organization {
            record.contact.organization = Some(org.clone());
        }
        if let Some(title) = &self.title {
            record.subject.title = title.clone();
        }
        if let Some(org) = &self.organization {
            record.subject.organization = org.clone();
        }
        if let Some(salary) = &self.salary {
            record.subject.salary = Some(salary.clone());
        }
        if let Some(description) = &self.description {
            record.subject.description = Some(description.clone());
        }
        if let Some(tags) = &self.tags {
            record.subject.tags = tags.clone();
        }
    }
}

fn sanitize_patch(patch: &mut RecordPatch) {
    if let Some(contact) = &mut patch.contact {
        if let Some(phone) = contact.phone.take() {
            contact.phone = Some(strip_control_chars(&phone, false));
        }
        if let Some(org) = contact.organization.take() {
            contact.organization = Some(strip_control_chars(&org, false));
        }
    }
    if let Some(subject) = &mut patch.subject {
        if let Some(title) = subject.title.take() {
            subject.title = Some(strip_control_chars(&title, false));
        }
        if let Some(org) = subject.organization.take() {
            subject.organization = Some(strip_control_chars(&org, false));
        }
        if let Some(desc) = subject.description.take() {
            subject.description = Some(strip_control_chars(&desc, true));
        }
        if let Some(tags) = &mut subject.tags {
            for tag in tags.iter_mut() {
                *tag = strip_control_chars(tag, false);
            }
        }
        if let Some(salary) = &mut subject.salary {
            salary.currency = strip_control_chars(&salary.currency, false);
            if let Some(period) = salary.period.take() {
                salary.period = Some(strip_control_chars(&period, false));
            }
        }
    }
}

/// Validate an update patch, returning either the normalized patch or every
/// offending field.
pub fn validate_patch(mut patch: RecordPatch) -> Result<NormalizedPatch, Vec<FieldError>> {
    sanitize_patch(&mut patch);

    let mut errors = match patch.validate() {
        Ok(()) => Vec::new(),
        Err(validation_errors) => crate::validation::flatten_errors(&validation_errors),
    };

    let salary = match patch.subject.as_ref().and_then(|s| s.salary.as_ref()) {
        Some(salary_draft) if errors.is_empty() => {
            convert_salary(salary_draft, "subject.salary", &mut errors)
        }
        _ => None,
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    let contact = patch.contact.unwrap_or_default();
    let subject = patch.subject.unwrap_or_default();

    Ok(NormalizedPatch {
        contact_phone: contact.phone.map(|p| normalize_phone(&p)),
        contact_organization: contact.organization,
        title: subject.title,
        organization: subject.organization,
        salary,
        description: subject.description,
        tags: subject.tags,
    })
}
