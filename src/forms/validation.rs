//! Field-level validation for document forms.
//!
//! Every failure is collected rather than returned on first error, so a form
//! can show a message next to each offending field at once.

use std::fmt;

use chrono::{NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::{FieldRule, FieldSpec};

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("email regex");
}

/// Validation error for a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ValidationError {
    /// Key of the field that failed, e.g. `dateOfBirth`.
    pub field: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn required(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} is required", label))
    }

    pub fn invalid_date(field: &str, label: &str, value: &str) -> Self {
        Self::new(field, format!("{} '{}' is not a valid date", label, value))
            .with_suggestion("Use the format YYYY-MM-DD, e.g. 1990-01-01")
    }

    pub fn future_date(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} cannot be in the future", label))
    }

    pub fn not_in_options(field: &str, label: &str, options: &[&str]) -> Self {
        Self::new(field, format!("{} must be one of: {}", label, options.join(", ")))
    }

    pub fn too_short(field: &str, label: &str, min: usize) -> Self {
        Self::new(
            field,
            format!("{} must be at least {} characters", label, min),
        )
    }

    pub fn invalid_id_number(field: &str) -> Self {
        Self::new(field, "ID number must be a valid 13-digit South African ID number")
            .with_suggestion("Check the number printed on the ID, e.g. 9001015009086")
    }

    pub fn invalid_email(field: &str) -> Self {
        Self::new(field, "Email address is not valid")
            .with_suggestion("Use an address such as name@example.co.za")
    }

    pub fn invalid_phone(field: &str) -> Self {
        Self::new(field, "Phone number is not valid")
            .with_suggestion("Use 10 to 15 digits, e.g. 0821234567 or +27821234567")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors with formatted output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// Errors reported for one field, in the order they were found.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| e.field == field)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.for_field(field).next().is_some()
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Human-readable summary of every error.
    pub fn summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }

        let mut parts = vec![format!(
            "Validation failed: {} error(s) found",
            self.errors.len()
        )];
        for (i, error) in self.errors.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, error));
        }
        parts.join("\n")
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

// ============================================================================
// Validation functions
// ============================================================================

/// Validate one field value against its spec. `None` and blank values only
/// fail when the field is required.
pub fn validate_field(spec: &FieldSpec, value: Option<&str>, errors: &mut ValidationErrors) {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        if spec.required {
            errors.add(ValidationError::required(spec.key, spec.label));
        }
        return;
    }

    for rule in spec.rules {
        match rule {
            FieldRule::Date => validate_date(trimmed, spec.key, spec.label, errors),
            FieldRule::OneOf(options) => {
                validate_one_of(trimmed, options, spec.key, spec.label, errors)
            }
            FieldRule::MinLength(min) => {
                validate_min_length(trimmed, *min, spec.key, spec.label, errors)
            }
            FieldRule::IdNumber => validate_id_number(trimmed, spec.key, errors),
            FieldRule::Email => validate_email(trimmed, spec.key, errors),
            FieldRule::Phone => validate_phone(trimmed, spec.key, errors),
        }
    }
}

/// `YYYY-MM-DD`, not after today.
pub fn validate_date(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) if date > Utc::now().date_naive() => {
            errors.add(ValidationError::future_date(field, label))
        }
        Ok(_) => {}
        Err(_) => errors.add(ValidationError::invalid_date(field, label, value)),
    }
}

pub fn validate_one_of(
    value: &str,
    options: &[&str],
    field: &str,
    label: &str,
    errors: &mut ValidationErrors,
) {
    if !options.iter().any(|o| o.eq_ignore_ascii_case(value)) {
        errors.add(ValidationError::not_in_options(field, label, options));
    }
}

pub fn validate_min_length(
    value: &str,
    min: usize,
    field: &str,
    label: &str,
    errors: &mut ValidationErrors,
) {
    if value.chars().count() < min {
        errors.add(ValidationError::too_short(field, label, min));
    }
}

/// 13 digits with a valid Luhn check digit.
pub fn validate_id_number(value: &str, field: &str, errors: &mut ValidationErrors) {
    let valid = value.len() == 13
        && value.chars().all(|c| c.is_ascii_digit())
        && luhn_checksum_ok(value);
    if !valid {
        errors.add(ValidationError::invalid_id_number(field));
    }
}

pub fn validate_email(value: &str, field: &str, errors: &mut ValidationErrors) {
    if !EMAIL_RE.is_match(value) {
        errors.add(ValidationError::invalid_email(field));
    }
}

pub fn validate_phone(value: &str, field: &str, errors: &mut ValidationErrors) {
    // Separators and a leading + are allowed, letters are not.
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '+'));
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    if !allowed || !(10..=15).contains(&digits) {
        errors.add(ValidationError::invalid_phone(field));
    }
}

fn luhn_checksum_ok(digits: &str) -> bool {
    let sum: u32 = digits
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}
