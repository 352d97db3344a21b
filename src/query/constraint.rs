//! Constraint and sort-order specifications.

use std::collections::HashMap;
use std::fmt;

use crate::common::Result;
use crate::record::Field;

/// Field → required substring, matched case-insensitively.
///
/// Keys are resolved to [`Field`]s on insert, so a set that exists only
/// names real attributes. Insertion order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    constraints: HashMap<Field, String>,
}

impl ConstraintSet {
    /// An empty set, matching every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain `field` to contain `value`. Replaces an earlier constraint
    /// on the same field.
    pub fn insert(&mut self, field: Field, value: impl Into<String>) {
        self.constraints.insert(field, value.into());
    }

    /// Constrain the attribute called `name`.
    ///
    /// # Errors
    /// Returns `Error::UnknownField` if no attribute has that name.
    pub fn insert_named(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let field = name.parse::<Field>()?;
        self.insert(field, value);
        Ok(())
    }

    /// The constraint value on `field`, if any.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.constraints.get(&field).map(String::as_str)
    }

    /// Drop the constraint on `field`, returning its value.
    pub fn remove(&mut self, field: Field) -> Option<String> {
        self.constraints.remove(&field)
    }

    /// Iterate over (field, value) pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.constraints.iter().map(|(f, v)| (*f, v.as_str()))
    }

    /// Number of constrained fields.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether no field is constrained.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl FromIterator<(Field, String)> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = (Field, String)>>(iter: I) -> Self {
        Self {
            constraints: iter.into_iter().collect(),
        }
    }
}

/// Sort direction for one key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// The attribute a sort order refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    Field(Field),
    /// A name that didn't resolve. Orders every pair as equal.
    Unresolved(String),
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Field(field) => write!(f, "{}", field),
            SortKey::Unresolved(name) => write!(f, "{}?", name),
        }
    }
}

/// One (attribute, direction) pair in a sort-order set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortOrder {
    /// Ascending order on `field`.
    pub fn asc(field: Field) -> Self {
        Self {
            key: SortKey::Field(field),
            direction: SortDirection::Ascending,
        }
    }

    /// Descending order on `field`.
    pub fn desc(field: Field) -> Self {
        Self {
            key: SortKey::Field(field),
            direction: SortDirection::Descending,
        }
    }

    /// Build a sort order from an attribute name.
    ///
    /// Unknown names don't fail: they become a no-op key so the rest of the
    /// query still runs.
    pub fn named(name: &str, direction: SortDirection) -> Self {
        let key = match name.parse::<Field>() {
            Ok(field) => SortKey::Field(field),
            Err(_) => {
                tracing::warn!(field = name, "unknown sort field, ignoring it");
                SortKey::Unresolved(name.to_string())
            }
        };
        Self { key, direction }
    }
}
