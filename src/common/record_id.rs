//! Record identifier type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a persisted record.
///
/// Identities are allocated by the store on first insert, start at 1, and
/// are never reused, even after the record is deleted.
///
/// # Example
/// ```
/// use phonebook::RecordId;
///
/// let id = RecordId::new(42);
/// assert_eq!(id.0, 42);
/// assert_eq!(id.next(), RecordId::new(43));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    /// First identity handed out by an empty store.
    pub const FIRST: RecordId = RecordId(1);

    /// Create a new RecordId.
    #[inline]
    pub fn new(id: u64) -> Self {
        RecordId(id)
    }

    /// The identity allocated after this one.
    #[inline]
    pub fn next(self) -> Self {
        RecordId(self.0 + 1)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_ordering() {
        assert!(RecordId::new(1) < RecordId::new(2));
        assert!(RecordId::new(5) > RecordId::new(3));
    }

    #[test]
    fn test_record_id_display() {
        assert_eq!(format!("{}", RecordId::new(42)), "Record(42)");
    }

    #[test]
    fn test_record_id_serializes_as_number() {
        let json = serde_json::to_string(&RecordId::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
