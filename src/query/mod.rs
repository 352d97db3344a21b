//! Dynamic query translation.
//!
//! Queries name attributes at runtime; this module turns them into a
//! predicate and a comparator over [`Record`](crate::Record)s:
//! - [`ConstraintSet`] - Field → substring filters
//! - [`SortOrder`] - Ordered (field, direction) sort keys
//! - [`Query`] - Constraints + sort orders + pagination window
//! - [`QueryTranslator`] - Runs queries against a store

mod constraint;
#[allow(clippy::module_inception)]
mod query;
mod translator;

pub use constraint::{ConstraintSet, SortDirection, SortKey, SortOrder};
pub use query::Query;
pub use translator::{apply, comparator, predicate, QueryTranslator, SizeListener};
