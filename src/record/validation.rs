//! Field-level validation applied before a record is saved.

use std::fmt;

use crate::record::{Field, Record};

/// Minimum number of characters in a first or last name.
pub const MIN_NAME_LEN: usize = 3;

/// Number of digits in a phone number.
pub const PHONE_DIGITS: usize = 11;

/// A validation failure attached to one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    /// Create an error on `field` with a user-facing message.
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// The error reported when another record already uses the phone number.
    pub fn duplicate_phone_number() -> Self {
        Self::new(Field::PhoneNumber, "Phone number must be unique")
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Checks the per-field rules a record must satisfy to be saved.
///
/// Uniqueness is not checked here since it needs the store; the edit
/// coordinator runs that check separately.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordValidator;

impl RecordValidator {
    /// Create a validator with the standard rules.
    pub fn new() -> Self {
        Self
    }

    /// Validate every attribute, returning all failures in field order.
    pub fn validate(&self, record: &Record) -> Vec<FieldError> {
        let mut errors = Vec::new();

        check_name(&mut errors, Field::FirstName, "First Name", &record.first_name);
        check_name(&mut errors, Field::LastName, "Last Name", &record.last_name);
        check_required(&mut errors, Field::Street, "Street", &record.street);
        check_required(&mut errors, Field::City, "City", &record.city);
        check_required(&mut errors, Field::Country, "Country", &record.country);

        match non_blank(&record.phone_number) {
            None => errors.push(FieldError::new(Field::PhoneNumber, "Phone number is required")),
            Some(phone) if !is_valid_phone_number(phone) => errors.push(FieldError::new(
                Field::PhoneNumber,
                format!("Phone number must be {} digits", PHONE_DIGITS),
            )),
            Some(_) => {}
        }

        match non_blank(&record.email) {
            None => errors.push(FieldError::new(Field::Email, "Email is required")),
            Some(email) if !is_valid_email(email) => errors.push(FieldError::new(
                Field::Email,
                "Please enter a valid email address",
            )),
            Some(_) => {}
        }

        errors
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn check_required(errors: &mut Vec<FieldError>, field: Field, label: &str, value: &Option<String>) {
    if non_blank(value).is_none() {
        errors.push(FieldError::new(field, format!("{} is required", label)));
    }
}

fn check_name(errors: &mut Vec<FieldError>, field: Field, label: &str, value: &Option<String>) {
    match non_blank(value) {
        None => errors.push(FieldError::new(field, format!("{} is required", label))),
        Some(name) if name.chars().count() < MIN_NAME_LEN => errors.push(FieldError::new(
            field,
            format!("Name must be at least {} characters long", MIN_NAME_LEN),
        )),
        Some(_) => {}
    }
}

/// Exactly [`PHONE_DIGITS`] ASCII digits, nothing else.
pub fn is_valid_phone_number(phone: &str) -> bool {
    phone.len() == PHONE_DIGITS && phone.bytes().all(|b| b.is_ascii_digit())
}

/// One `@`, a non-empty local part, and a dotted domain without whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split('.')
            .all(|label| !label.is_empty())
        && domain.contains('.')
}
