//! Record types.
//!
//! This module contains:
//! - [`Record`] - A contact with a store-assigned identity
//! - [`Field`] - Static name → accessor mapping for record attributes
//! - [`RecordValidator`] - Per-field save rules

mod field;
#[allow(clippy::module_inception)]
mod record;
mod validation;

pub use field::{Field, FieldValue};
pub use record::Record;
pub use validation::{is_valid_email, is_valid_phone_number, FieldError, RecordValidator};
