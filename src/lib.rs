//! phonebook - a contact-directory backend with advisory edit locks.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Directory (directory.rs)                    │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────────────┐                               │
//! │  │  EditCoordinator (edit/)     │  open / save / cancel /       │
//! │  │  sessions + validation       │  delete / open_for_new        │
//! │  └──────┬────────────────┬──────┘                               │
//! │         ↓                ↓                                      │
//! │  ┌──────────────┐  ┌─────────────────────────────────────────┐  │
//! │  │EditLockTracker│ │  QueryTranslator (query/)               │  │
//! │  │ RecordId →    │ │  constraints → predicate                │  │
//! │  │ open sessions │ │  sort orders → comparator, skip/take    │  │
//! │  └──────────────┘  └───────────────────┬─────────────────────┘  │
//! │                                        ↓                        │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │  StoreAdapter (storage/)  [error boundary]              │    │
//! │  │  RecordStore: MemoryRecordStore | FileRecordStore       │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (RecordId, Error, config)
//! - [`record`] - The contact record, its fields and validation rules
//! - [`storage`] - Record stores and the adapter in front of them
//! - [`query`] - Dynamic filtering, sorting and pagination
//! - [`edit`] - Edit-lock tracking and the session lifecycle
//! - [`directory`] - Everything above wired together
//!
//! # Quick Start
//! ```
//! use std::sync::Arc;
//! use phonebook::{Directory, MemoryRecordStore, Record, SaveOutcome, SessionState};
//!
//! let directory = Directory::new(Arc::new(MemoryRecordStore::new()));
//! let coordinator = directory.coordinator();
//!
//! let mut session = coordinator.open_for_new();
//! *session.record_mut().unwrap() = Record::new()
//!     .with_first_name("Grace")
//!     .with_last_name("Hopper")
//!     .with_street("1 Navy Way")
//!     .with_city("Arlington")
//!     .with_country("USA")
//!     .with_phone_number("12025550123")
//!     .with_email("grace@example.com");
//!
//! let outcome = coordinator.save(&mut session).unwrap();
//! assert!(matches!(outcome, SaveOutcome::Saved(_)));
//! assert_eq!(session.state(), SessionState::Saved);
//! ```

pub mod common;
pub mod directory;
pub mod edit;
pub mod query;
pub mod record;
pub mod storage;

// Re-export commonly used types at crate root
pub use common::{AppConfig, BackendKind, Error, ErrorKind, RecordId, Result, StoreConfig};
pub use directory::Directory;
pub use edit::{
    EditCoordinator, EditGrant, EditLockTracker, EditSession, EditStats, SaveOutcome, SessionId,
    SessionState, StatsSnapshot,
};
pub use query::{Query, QueryTranslator, SortDirection};
pub use record::{Field, FieldError, FieldValue, Record};
pub use storage::{FileRecordStore, MemoryRecordStore, RecordStore};
