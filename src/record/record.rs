//! Record - one contact in the directory.

use serde::{Deserialize, Serialize};

use crate::common::{Error, RecordId, Result};
use crate::record::Field;

/// A contact record.
///
/// The identity is `None` until the record is first persisted. After that
/// the store owns it: there is no public way to change or clear it.
///
/// # Example
/// ```
/// use phonebook::Record;
///
/// let record = Record::new()
///     .with_first_name("Ada")
///     .with_last_name("Lovelace")
///     .with_phone_number("44123456789");
/// assert!(!record.is_persisted());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    id: Option<RecordId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

impl Record {
    /// Create an empty, unpersisted record.
    pub fn new() -> Self {
        Self::default()
    }

    /// The record's identity, if it has been persisted.
    #[inline]
    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    /// Whether the store has assigned an identity.
    #[inline]
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Set the identity. Only stores call this, on insert or when decoding.
    pub(crate) fn assign_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    /// Write a text attribute by field.
    ///
    /// # Errors
    /// Returns `Error::ReadOnlyField` for [`Field::Id`].
    pub fn set(&mut self, field: Field, value: impl Into<String>) -> Result<()> {
        let slot = self.text_slot(field)?;
        *slot = Some(value.into());
        Ok(())
    }

    /// Clear a text attribute by field.
    pub fn clear(&mut self, field: Field) -> Result<()> {
        *self.text_slot(field)? = None;
        Ok(())
    }

    fn text_slot(&mut self, field: Field) -> Result<&mut Option<String>> {
        match field {
            Field::Id => Err(Error::ReadOnlyField(Field::Id.name())),
            Field::FirstName => Ok(&mut self.first_name),
            Field::LastName => Ok(&mut self.last_name),
            Field::Street => Ok(&mut self.street),
            Field::City => Ok(&mut self.city),
            Field::Country => Ok(&mut self.country),
            Field::PhoneNumber => Ok(&mut self.phone_number),
            Field::Email => Ok(&mut self.email),
        }
    }

    /// Whether every attribute except the identity matches `other`.
    pub fn same_attributes(&self, other: &Record) -> bool {
        Field::ALL
            .iter()
            .filter(|f| f.is_text())
            .all(|f| f.value(self) == f.value(other))
    }

    /// Builder: set the first name.
    pub fn with_first_name(mut self, value: impl Into<String>) -> Self {
        self.first_name = Some(value.into());
        self
    }

    /// Builder: set the last name.
    pub fn with_last_name(mut self, value: impl Into<String>) -> Self {
        self.last_name = Some(value.into());
        self
    }

    /// Builder: set the street.
    pub fn with_street(mut self, value: impl Into<String>) -> Self {
        self.street = Some(value.into());
        self
    }

    /// Builder: set the city.
    pub fn with_city(mut self, value: impl Into<String>) -> Self {
        self.city = Some(value.into());
        self
    }

    /// Builder: set the country.
    pub fn with_country(mut self, value: impl Into<String>) -> Self {
        self.country = Some(value.into());
        self
    }

    /// Builder: set the phone number.
    pub fn with_phone_number(mut self, value: impl Into<String>) -> Self {
        self.phone_number = Some(value.into());
        self
    }

    /// Builder: set the email address.
    pub fn with_email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }
}
