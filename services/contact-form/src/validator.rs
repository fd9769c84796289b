// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact submission schema.
//!
//! Accepts an untyped JSON value and produces either a typed
//! [`SubmissionRequest`] or the list of field-level errors, in declaration
//! order (name, email, subject, message). Values are trimmed before any
//! length rule is applied; lengths count Unicode scalar values.

use crate::sanitize::strip_markup;
use email_address::EmailAddress;
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// A single violated rule.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Typed submission, trimmed but not yet sanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Submission ready to be rendered into an email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl SubmissionRequest {
    /// Strip markup from the free-text fields. The email address is already
    /// format-checked and passes through unchanged.
    pub fn sanitize(self) -> ValidatedSubmission {
        ValidatedSubmission {
            name: strip_markup(&self.name),
            email: self.email,
            subject: strip_markup(&self.subject),
            message: strip_markup(&self.message),
        }
    }
}

/// Length bounds and labels for one text field.
struct TextRule {
    field: &'static str,
    label: &'static str,
    min: usize,
    max: usize,
}

const NAME: TextRule = TextRule {
    field: "name",
    label: "Name",
    min: 2,
    max: 100,
};

const SUBJECT: TextRule = TextRule {
    field: "subject",
    label: "Subject",
    min: 5,
    max: 200,
};

const MESSAGE: TextRule = TextRule {
    field: "message",
    label: "Message",
    min: 10,
    max: 2000,
};

const EMAIL_FIELD: &str = "email";
const EMAIL_MAX: usize = 255;

/// Contact form schema validator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContactSchema;

impl ContactSchema {
    pub fn new() -> Self {
        Self
    }

    /// Validate an untyped request body.
    pub fn validate(&self, input: &Value) -> Result<SubmissionRequest, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = check_text(input, &NAME, &mut errors);
        let email = check_email(input, &mut errors);
        let subject = check_text(input, &SUBJECT, &mut errors);
        let message = check_text(input, &MESSAGE, &mut errors);

        match (name, email, subject, message) {
            (Some(name), Some(email), Some(subject), Some(message)) if errors.is_empty() => {
                Ok(SubmissionRequest {
                    name,
                    email,
                    subject,
                    message,
                })
            }
            _ => {
                debug!(
                    fields = ?errors.iter().map(|e| e.field).collect::<Vec<_>>(),
                    "Submission failed validation"
                );
                Err(errors)
            }
        }
    }
}

/// Fetch a field as a trimmed string, recording "required" when absent.
fn required_string(
    input: &Value,
    field: &'static str,
    label: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match input.get(field).and_then(Value::as_str) {
        Some(value) => Some(value.trim().to_string()),
        None => {
            errors.push(FieldError::new(field, format!("{label} is required")));
            None
        }
    }
}

fn check_text(input: &Value, rule: &TextRule, errors: &mut Vec<FieldError>) -> Option<String> {
    let value = required_string(input, rule.field, rule.label, errors)?;
    let len = value.chars().count();
    let before = errors.len();

    if len < rule.min {
        errors.push(FieldError::new(
            rule.field,
            format!("{} must be at least {} characters", rule.label, rule.min),
        ));
    }
    if len > rule.max {
        errors.push(FieldError::new(
            rule.field,
            format!("{} must be less than {} characters", rule.label, rule.max),
        ));
    }

    (errors.len() == before).then_some(value)
}

fn check_email(input: &Value, errors: &mut Vec<FieldError>) -> Option<String> {
    let value = required_string(input, EMAIL_FIELD, "Email", errors)?;
    let before = errors.len();

    if !is_valid_email(&value) {
        errors.push(FieldError::new(
            EMAIL_FIELD,
            "Please enter a valid email address",
        ));
    }
    if value.chars().count() > EMAIL_MAX {
        errors.push(FieldError::new(
            EMAIL_FIELD,
            format!("Email must be less than {EMAIL_MAX} characters"),
        ));
    }

    (errors.len() == before).then_some(value)
}

/// RFC 5322 address syntax, restricted to a public `host.tld` domain.
pub fn is_valid_email(address: &str) -> bool {
    let Ok(parsed) = EmailAddress::from_str(address) else {
        return false;
    };
    // Display-name forms such as `Ada <ada@example.com>` parse too
    if format!("{}@{}", parsed.local_part(), parsed.domain()) != address {
        return false;
    }

    let labels: Vec<&str> = parsed.domain().split('.').collect();
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    match labels.as_slice() {
        [_, .., tld] => {
            labels_ok && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
        }
        _ => false,
    }
}
