//! Edit coordination.
//!
//! This module keeps concurrent clients from overwriting each other:
//! - [`EditLockTracker`] - Advisory per-record edit locks (open counts)
//! - [`EditSession`] - One client's view of one record
//! - [`EditCoordinator`] - Drives session transitions against the store
//! - [`EditStats`] - Grant/busy/save counters
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use phonebook::{Directory, MemoryRecordStore, Record, SessionState};
//!
//! let store = MemoryRecordStore::with_records(vec![
//!     Record::new().with_first_name("Ada").with_phone_number("12345678901"),
//! ]).unwrap();
//! let directory = Directory::new(Arc::new(store));
//! let record = directory.query(&Default::default()).remove(0);
//!
//! let coordinator = directory.coordinator();
//! let first = coordinator.open_for_edit(record.clone()).unwrap();
//! let second = coordinator.open_for_edit(record).unwrap();
//!
//! assert_eq!(first.state(), SessionState::Editing);
//! assert_eq!(second.state(), SessionState::Blocked);
//! ```

mod coordinator;
mod lock_tracker;
mod session;
mod stats;

pub use coordinator::{EditCoordinator, SaveOutcome};
pub use lock_tracker::{EditGrant, EditLockTracker};
pub use session::{
    Affordances, EditSession, Notice, SessionId, SessionState, CONFLICT_MESSAGE, NOTICE_DURATION,
};
pub use stats::{EditStats, StatsSnapshot};
