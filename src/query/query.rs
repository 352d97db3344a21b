//! Query - constraints, sort orders and a pagination window.

use crate::common::Result;
use crate::query::{ConstraintSet, SortDirection, SortKey, SortOrder};
use crate::record::Field;

/// A paged record query.
///
/// # Example
/// ```
/// use phonebook::query::{Query, SortDirection};
/// use phonebook::Field;
///
/// let query = Query::new()
///     .filter(Field::City, "oslo")
///     .sort(Field::LastName, SortDirection::Ascending)
///     .sort(Field::FirstName, SortDirection::Ascending)
///     .page(20, 10);
/// assert_eq!(query.offset, 20);
/// assert_eq!(query.limit, Some(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub constraints: ConstraintSet,
    /// First entry is the primary key; later entries break ties in order.
    pub sort_orders: Vec<SortOrder>,
    /// Records skipped after filtering and sorting.
    pub offset: usize,
    /// Maximum records returned, `None` for no limit.
    pub limit: Option<usize>,
}

impl Query {
    /// An unconstrained, unsorted, unpaged query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to contain `value`, ignoring case. Replaces any earlier
    /// constraint on the same field.
    pub fn filter(mut self, field: Field, value: impl Into<String>) -> Self {
        self.constraints.insert(field, value);
        self
    }

    /// Add a constraint by attribute name.
    ///
    /// # Errors
    /// Returns `Error::UnknownField` if no attribute has that name.
    pub fn filter_named(mut self, name: &str, value: impl Into<String>) -> Result<Self> {
        self.constraints.insert_named(name, value)?;
        Ok(self)
    }

    /// Append a sort key; earlier keys take precedence.
    pub fn sort(mut self, field: Field, direction: SortDirection) -> Self {
        self.sort_orders.push(SortOrder {
            key: SortKey::Field(field),
            direction,
        });
        self
    }

    /// Add a sort key by attribute name. Unknown names sort as a no-op.
    pub fn sort_named(mut self, name: &str, direction: SortDirection) -> Self {
        self.sort_orders.push(SortOrder::named(name, direction));
        self
    }

    /// Skip `offset` matches and return at most `limit`.
    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    /// The same query with pagination stripped, as used for counting.
    pub fn unpaged(&self) -> Self {
        Self {
            constraints: self.constraints.clone(),
            sort_orders: self.sort_orders.clone(),
            offset: 0,
            limit: None,
        }
    }
}
