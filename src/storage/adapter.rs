//! StoreAdapter - the error boundary around a [`RecordStore`].
//!
//! Store failures stop here. Callers above this layer only ever see an
//! empty result, a no-op, or a uniqueness [`WriteOutcome::Conflict`].

use std::sync::Arc;

use crate::common::{ErrorKind, RecordId};
use crate::record::Record;
use crate::storage::RecordStore;

/// Result of a write that went through the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The record is stored under this identity.
    Written(RecordId),
    /// The store rejected the write on a uniqueness constraint.
    Conflict { field: &'static str, value: String },
    /// The store was unavailable or the target was gone; nothing changed.
    Skipped,
}

/// Degrading wrapper over a shared record store.
///
/// Cheap to clone; clones share the underlying store.
#[derive(Clone)]
pub struct StoreAdapter {
    store: Arc<dyn RecordStore>,
}

impl StoreAdapter {
    /// Wrap a shared store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// The wrapped store.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Full record set. An unavailable store reads as empty.
    pub fn fetch_all(&self) -> Vec<Record> {
        match self.store.fetch_all() {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(error = %err, "fetch failed, returning no records");
                Vec::new()
            }
        }
    }

    /// Insert or update `record`.
    pub fn persist(&self, record: &Record) -> WriteOutcome {
        match self.store.persist(record) {
            Ok(id) => {
                tracing::debug!(%id, "record persisted");
                WriteOutcome::Written(id)
            }
            Err(crate::Error::Conflict { field, value }) => {
                tracing::debug!(field, value = %value, "persist rejected by uniqueness constraint");
                WriteOutcome::Conflict { field, value }
            }
            Err(err) => {
                match err.kind() {
                    ErrorKind::NotFound => {
                        tracing::debug!(error = %err, "persist target is gone, ignoring")
                    }
                    _ => tracing::warn!(error = %err, "persist failed, ignoring"),
                }
                WriteOutcome::Skipped
            }
        }
    }

    /// Delete `record`. Failures are logged and otherwise ignored.
    pub fn delete(&self, record: &Record) {
        if let Err(err) = self.store.delete(record) {
            tracing::warn!(error = %err, id = ?record.id(), "delete failed, ignoring");
        }
    }

    /// Look up one record. An unavailable store reads as absent.
    pub fn find_by_id(&self, id: RecordId) -> Option<Record> {
        match self.store.find_by_id(id) {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(error = %err, %id, "lookup failed, treating as absent");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Error, Result};
    use crate::storage::MemoryRecordStore;

    struct OfflineStore;

    impl RecordStore for OfflineStore {
        fn fetch_all(&self) -> Result<Vec<Record>> {
            Err(Error::BackendUnavailable("connection refused".into()))
        }

        fn persist(&self, _record: &Record) -> Result<RecordId> {
            Err(Error::BackendUnavailable("connection refused".into()))
        }

        fn delete(&self, _record: &Record) -> Result<()> {
            Err(Error::BackendUnavailable("connection refused".into()))
        }

        fn find_by_id(&self, _id: RecordId) -> Result<Option<Record>> {
            Err(Error::BackendUnavailable("connection refused".into()))
        }
    }

    #[test]
    fn test_unavailable_store_degrades() {
        let adapter = StoreAdapter::new(Arc::new(OfflineStore));

        assert!(adapter.fetch_all().is_empty());
        assert_eq!(adapter.persist(&Record::new()), WriteOutcome::Skipped);
        assert_eq!(adapter.find_by_id(RecordId::new(1)), None);
        adapter.delete(&Record::new());
    }

    #[test]
    fn test_conflict_is_surfaced() {
        let adapter = StoreAdapter::new(Arc::new(MemoryRecordStore::new()));
        let record = Record::new().with_phone_number("12345678901");

        assert_eq!(adapter.persist(&record), WriteOutcome::Written(RecordId::new(1)));
        assert_eq!(
            adapter.persist(&record),
            WriteOutcome::Conflict {
                field: "phoneNumber",
                value: "12345678901".into()
            }
        );
    }

    #[test]
    fn test_update_of_missing_record_is_skipped() {
        let adapter = StoreAdapter::new(Arc::new(MemoryRecordStore::new()));
        let mut record = Record::new();
        record.assign_id(RecordId::new(12));

        assert_eq!(adapter.persist(&record), WriteOutcome::Skipped);
    }
}
