//! Static attribute mapping for records.
//!
//! Queries name attributes by string (`"phoneNumber"`, `"city"`, ...). Names
//! are resolved to a [`Field`] once, when the query is built, and every
//! subsequent access goes through a typed accessor.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::common::{Error, Result};
use crate::record::Record;

/// A queryable record attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Id,
    FirstName,
    LastName,
    Street,
    City,
    Country,
    PhoneNumber,
    Email,
}

impl Field {
    /// Every field, in column order.
    pub const ALL: [Field; 8] = [
        Field::Id,
        Field::FirstName,
        Field::LastName,
        Field::Street,
        Field::City,
        Field::Country,
        Field::PhoneNumber,
        Field::Email,
    ];

    /// Canonical attribute name.
    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Street => "street",
            Field::City => "city",
            Field::Country => "country",
            Field::PhoneNumber => "phoneNumber",
            Field::Email => "email",
        }
    }

    /// Whether the attribute is a user-editable string.
    #[inline]
    pub fn is_text(self) -> bool {
        self != Field::Id
    }

    /// Read this attribute from a record. `None` when the value is unset.
    pub fn value(self, record: &Record) -> Option<FieldValue<'_>> {
        let text = match self {
            Field::Id => return record.id().map(|id| FieldValue::Id(id.0)),
            Field::FirstName => &record.first_name,
            Field::LastName => &record.last_name,
            Field::Street => &record.street,
            Field::City => &record.city,
            Field::Country => &record.country,
            Field::PhoneNumber => &record.phone_number,
            Field::Email => &record.email,
        };
        text.as_deref().map(FieldValue::Text)
    }

    /// Compare two records by this attribute's natural ordering.
    ///
    /// Unset values order before set ones.
    pub fn compare(self, a: &Record, b: &Record) -> Ordering {
        self.value(a).cmp(&self.value(b))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = Error;

    /// Accepts the canonical camelCase names and their snake_case spellings.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "id" => Ok(Field::Id),
            "firstName" | "first_name" => Ok(Field::FirstName),
            "lastName" | "last_name" => Ok(Field::LastName),
            "street" => Ok(Field::Street),
            "city" => Ok(Field::City),
            "country" => Ok(Field::Country),
            "phoneNumber" | "phone_number" => Ok(Field::PhoneNumber),
            "email" => Ok(Field::Email),
            other => Err(Error::UnknownField(other.to_string())),
        }
    }
}

/// A borrowed attribute value.
///
/// Identities compare numerically, text compares case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldValue<'a> {
    Id(u64),
    Text(&'a str),
}

impl FieldValue<'_> {
    /// Case-insensitive substring test used by query constraints.
    ///
    /// `needle` must already be lowercase.
    pub fn contains_lowercase(&self, needle: &str) -> bool {
        match self {
            FieldValue::Id(id) => id.to_string().contains(needle),
            FieldValue::Text(text) => text.to_lowercase().contains(needle),
        }
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Id(id) => write!(f, "{}", id),
            FieldValue::Text(text) => f.write_str(text),
        }
    }
}
