//! Storage layer - record persistence.
//!
//! This module handles persistent storage:
//! - [`RecordStore`] - The four-operation contract every backend implements
//! - [`MemoryRecordStore`] / [`FileRecordStore`] - The two backends
//! - [`StoreAdapter`] - The error boundary the rest of the crate talks to
//! - [`open_store`] - Builds the backend named by a [`StoreConfig`]

mod adapter;
mod file_store;
pub mod line;
mod memory_store;
mod table;

use std::sync::Arc;

pub use adapter::{StoreAdapter, WriteOutcome};
pub use file_store::FileRecordStore;
pub use memory_store::MemoryRecordStore;

use crate::common::{BackendKind, RecordId, Result, StoreConfig};
use crate::record::Record;

/// CRUD over a backing store for contact records.
///
/// Implementations know nothing about edit coordination: two interleaved
/// updates to the same identity are both applied, last writer wins.
/// Callers go through the edit coordinator to avoid that.
///
/// # Errors
/// Implementations report failures with these [`Error`](crate::Error)
/// variants:
/// - `Conflict` when a write would duplicate a phone number
/// - `NotFound` when an update targets an identity that doesn't exist
/// - anything classified as `BackendUnavailable` when the store can't serve
///   the request
pub trait RecordStore: Send + Sync {
    /// Every stored record, in ascending identity order. No paging.
    fn fetch_all(&self) -> Result<Vec<Record>>;

    /// Insert (identity unset) or update by identity.
    ///
    /// Returns the identity of the stored record; for inserts this is the
    /// freshly allocated one.
    fn persist(&self, record: &Record) -> Result<RecordId>;

    /// Remove by identity. Absent or unset identities are a no-op.
    fn delete(&self, record: &Record) -> Result<()>;

    /// Look up a single record.
    fn find_by_id(&self, id: RecordId) -> Result<Option<Record>>;
}

/// Construct the record store selected by `config`.
///
/// # Errors
/// Returns an error if the file backend cannot open or create its file.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn RecordStore>> {
    match config.backend {
        BackendKind::Memory => {
            tracing::debug!("using in-memory record store");
            Ok(Arc::new(MemoryRecordStore::new()))
        }
        BackendKind::File => Ok(Arc::new(FileRecordStore::open_or_create(
            config.file_path(),
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_memory_store() {
        let store = open_store(&StoreConfig::memory()).unwrap();
        assert!(store.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn test_open_file_store_reuses_file() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::file(dir.path().join("records.db"));

        let id = {
            let store = open_store(&config).unwrap();
            store.persist(&Record::new().with_first_name("Ada")).unwrap()
        };

        let store = open_store(&config).unwrap();
        assert!(store.find_by_id(id).unwrap().is_some());
    }
}
