//! RecordTable - the in-memory image shared by every store backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::common::{Error, RecordId, Result};
use crate::record::{Field, Record};

/// Records keyed by identity plus the identity allocator.
///
/// `BTreeMap` keeps iteration in ascending identity order, which is the
/// store iteration order queries fall back to when no sort is requested.
#[derive(Debug, Clone)]
pub(crate) struct RecordTable {
    records: BTreeMap<RecordId, Record>,
    next_id: RecordId,
}

/// Allocator state persisted alongside the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableHeader {
    pub next_id: RecordId,
}

impl RecordTable {
    /// An empty table allocating from the first identity.
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: RecordId::FIRST,
        }
    }

    /// Rebuild a table from a decoded header and records.
    ///
    /// The allocator is bumped past the largest identity seen so a stale
    /// header can never cause an identity to be handed out twice.
    pub fn from_parts(header: TableHeader, records: Vec<Record>) -> Self {
        let mut table = Self::new();
        table.next_id = header.next_id.max(RecordId::FIRST);
        for record in records {
            if let Some(id) = record.id() {
                if id >= table.next_id {
                    table.next_id = id.next();
                }
                table.records.insert(id, record);
            }
        }
        table
    }

    /// Allocator state to persist.
    pub fn header(&self) -> TableHeader {
        TableHeader {
            next_id: self.next_id,
        }
    }

    /// Records in ascending identity order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Look up a record by identity.
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(&id)
    }

    /// Insert or update, enforcing phone-number uniqueness.
    pub fn persist(&mut self, record: &Record) -> Result<RecordId> {
        self.check_phone_unique(record)?;

        match record.id() {
            None => {
                let id = self.next_id;
                self.next_id = id.next();

                let mut stored = record.clone();
                stored.assign_id(id);
                self.records.insert(id, stored);
                Ok(id)
            }
            Some(id) => {
                let slot = self.records.get_mut(&id).ok_or(Error::NotFound(id))?;
                *slot = record.clone();
                Ok(id)
            }
        }
    }

    /// Remove by identity. Returns whether a record was removed.
    pub fn remove(&mut self, id: RecordId) -> bool {
        self.records.remove(&id).is_some()
    }

    fn check_phone_unique(&self, record: &Record) -> Result<()> {
        let Some(phone) = record.phone_number.as_deref() else {
            return Ok(());
        };

        let taken = self
            .records
            .values()
            .any(|other| other.id() != record.id() && other.phone_number.as_deref() == Some(phone));

        if taken {
            Err(Error::Conflict {
                field: Field::PhoneNumber.name(),
                value: phone.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let mut table = RecordTable::new();
        let a = table.persist(&Record::new().with_phone_number("1")).unwrap();
        let b = table.persist(&Record::new().with_phone_number("2")).unwrap();
        assert_eq!(a, RecordId::new(1));
        assert_eq!(b, RecordId::new(2));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let mut table = RecordTable::new();
        let a = table.persist(&Record::new()).unwrap();
        assert!(table.remove(a));
        let b = table.persist(&Record::new()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_duplicate_phone_conflicts() {
        let mut table = RecordTable::new();
        table.persist(&Record::new().with_phone_number("111")).unwrap();

        let err = table
            .persist(&Record::new().with_phone_number("111"))
            .unwrap_err();
        assert!(matches!(err, Error::Conflict { field: "phoneNumber", .. }));
    }

    #[test]
    fn test_update_keeping_own_phone_is_not_conflict() {
        let mut table = RecordTable::new();
        let id = table.persist(&Record::new().with_phone_number("111")).unwrap();

        let mut record = table.get(id).unwrap().clone();
        record.city = Some("Lima".into());
        assert_eq!(table.persist(&record).unwrap(), id);
        assert_eq!(table.get(id).unwrap().city.as_deref(), Some("Lima"));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let mut table = RecordTable::new();
        let mut record = Record::new();
        record.assign_id(RecordId::new(77));
        assert!(matches!(table.persist(&record), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_from_parts_repairs_stale_allocator() {
        let mut record = Record::new();
        record.assign_id(RecordId::new(10));

        let table = RecordTable::from_parts(
            TableHeader {
                next_id: RecordId::new(3),
            },
            vec![record],
        );
        assert_eq!(table.header().next_id, RecordId::new(11));
    }
}
