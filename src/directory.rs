//! Directory - the assembled backend a presentation layer talks to.

use std::sync::Arc;

use crate::common::{AppConfig, RecordId, Result};
use crate::edit::{EditCoordinator, EditLockTracker};
use crate::query::{Query, QueryTranslator};
use crate::record::Record;
use crate::storage::{open_store, RecordStore, StoreAdapter};

/// A record store with its query translator, edit-lock tracker and edit
/// coordinator, wired together.
///
/// One `Directory` serves every client session; share it by reference or
/// wrap it in an `Arc`.
///
/// # Example
/// ```
/// use phonebook::{AppConfig, Directory, Field, Query};
///
/// let directory = Directory::from_config(&AppConfig::default()).unwrap();
/// let query = Query::new().filter(Field::City, "oslo").page(0, 25);
/// assert!(directory.query(&query).is_empty());
/// assert_eq!(directory.count(&query), 0);
/// ```
pub struct Directory {
    translator: Arc<QueryTranslator>,
    coordinator: EditCoordinator,
}

impl Directory {
    /// Wire a directory around an existing store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        let translator = Arc::new(QueryTranslator::new(StoreAdapter::new(store)));
        let tracker = Arc::new(EditLockTracker::new());
        let coordinator = EditCoordinator::new(tracker, Arc::clone(&translator));
        Self {
            translator,
            coordinator,
        }
    }

    /// Build the store named by `config` and wire a directory around it.
    ///
    /// # Errors
    /// Returns an error if the configured backend cannot be opened.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = open_store(&config.store)?;
        tracing::info!(backend = ?config.store.backend, "directory opened");
        Ok(Self::new(store))
    }

    /// One page of records matching `query`.
    pub fn query(&self, query: &Query) -> Vec<Record> {
        self.translator.fetch(query)
    }

    /// Total records matching `query`, ignoring its pagination window.
    pub fn count(&self, query: &Query) -> usize {
        self.translator.count(query)
    }

    /// Look up a record by identity. Unavailable stores read as absent.
    pub fn find_by_id(&self, id: RecordId) -> Option<Record> {
        self.translator.adapter().find_by_id(id)
    }

    /// The edit coordinator shared by every session.
    #[inline]
    pub fn coordinator(&self) -> &EditCoordinator {
        &self.coordinator
    }

    /// The query translator backing `query` and `count`.
    #[inline]
    pub fn translator(&self) -> &Arc<QueryTranslator> {
        &self.translator
    }

    /// The edit-lock tracker the coordinator consults.
    #[inline]
    pub fn tracker(&self) -> &Arc<EditLockTracker> {
        self.coordinator.tracker()
    }
}
