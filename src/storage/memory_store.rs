//! In-memory record store.

use parking_lot::RwLock;

use crate::common::{RecordId, Result};
use crate::record::Record;
use crate::storage::table::RecordTable;
use crate::storage::RecordStore;

/// A volatile store living entirely in process memory.
///
/// Useful for tests and for deployments that don't need durability.
/// Enforces the same phone-number uniqueness as the file store.
pub struct MemoryRecordStore {
    table: RwLock<RecordTable>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(RecordTable::new()),
        }
    }

    /// Create a store pre-populated with `records`.
    ///
    /// Records are inserted in order, so they receive identities 1..=n.
    pub fn with_records<I: IntoIterator<Item = Record>>(records: I) -> Result<Self> {
        let store = Self::new();
        {
            let mut table = store.table.write();
            for record in records {
                table.persist(&record)?;
            }
        }
        Ok(store)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryRecordStore {
    fn fetch_all(&self) -> Result<Vec<Record>> {
        Ok(self.table.read().iter().cloned().collect())
    }

    fn persist(&self, record: &Record) -> Result<RecordId> {
        self.table.write().persist(record)
    }

    fn delete(&self, record: &Record) -> Result<()> {
        if let Some(id) = record.id() {
            self.table.write().remove(id);
        }
        Ok(())
    }

    fn find_by_id(&self, id: RecordId) -> Result<Option<Record>> {
        Ok(self.table.read().get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;

    fn contact(first: &str, phone: &str) -> Record {
        Record::new().with_first_name(first).with_phone_number(phone)
    }

    #[test]
    fn test_insert_then_find_roundtrip() {
        let store = MemoryRecordStore::new();
        let record = contact("Ada", "11111111111").with_city("London");

        let id = store.persist(&record).unwrap();
        let found = store.find_by_id(id).unwrap().unwrap();

        assert_eq!(found.id(), Some(id));
        assert!(found.same_attributes(&record));
    }

    #[test]
    fn test_fetch_all_in_identity_order() {
        let store = MemoryRecordStore::with_records(vec![
            contact("Cy", "3"),
            contact("Al", "1"),
            contact("Bo", "2"),
        ])
        .unwrap();

        let names: Vec<_> = store
            .fetch_all()
            .unwrap()
            .into_iter()
            .map(|r| r.first_name.unwrap())
            .collect();
        assert_eq!(names, vec!["Cy", "Al", "Bo"]);
    }

    #[test]
    fn test_update_by_identity() {
        let store = MemoryRecordStore::new();
        let id = store.persist(&contact("Ada", "1")).unwrap();

        let mut record = store.find_by_id(id).unwrap().unwrap();
        record.first_name = Some("Augusta".into());
        store.persist(&record).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.find_by_id(id).unwrap().unwrap().first_name.as_deref(),
            Some("Augusta")
        );
    }

    #[test]
    fn test_phone_conflict() {
        let store = MemoryRecordStore::new();
        store.persist(&contact("Ada", "1")).unwrap();
        let err = store.persist(&contact("Bob", "1")).unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let store = MemoryRecordStore::new();
        let mut ghost = Record::new();
        ghost.assign_id(RecordId::new(404));

        assert!(store.delete(&ghost).is_ok());
        assert!(store.delete(&Record::new()).is_ok());
        assert!(store.is_empty());
    }
}
