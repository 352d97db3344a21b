//! Edit Session Coordinator - the client-visible edit lifecycle.
//!
//! The [`EditCoordinator`] drives every [`EditSession`] transition:
//! - `open_for_edit` / `open_for_new` create sessions
//! - `save`, `cancel` and `delete` close them
//!
//! It consults the [`EditLockTracker`] so that only one session per record
//! can save or delete, and writes through the [`StoreAdapter`] so store
//! failures never reach the client as errors.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::common::{Error, RecordId, Result};
use crate::edit::{EditGrant, EditLockTracker, EditSession, EditStats, SessionId, SessionState};
use crate::query::{Query, QueryTranslator};
use crate::record::{is_valid_phone_number, Field, FieldError, Record, RecordValidator};
use crate::storage::{StoreAdapter, WriteOutcome};

/// Result of [`EditCoordinator::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The record is stored under this identity. The session is closed.
    Saved(RecordId),
    /// The store was unavailable and dropped the write. The session is
    /// closed all the same.
    NotStored,
    /// Validation or a uniqueness check failed. Nothing was written and the
    /// session is still editing, holding its grant.
    Rejected(Vec<FieldError>),
}

/// Coordinates concurrent edit sessions over one store.
///
/// # Architecture
/// ```text
/// ┌───────────────────────────────────────────────────────┐
/// │                    EditCoordinator                    │
/// │  ┌─────────────────┐   ┌────────────────────────────┐ │
/// │  │ EditLockTracker │   │      QueryTranslator       │ │
/// │  │ RecordId → open │   │  uniqueness scans, reads   │ │
/// │  │ sessions (Mutex)│   └─────────────┬──────────────┘ │
/// │  └─────────────────┘                 ▼                │
/// │                        ┌────────────────────────────┐ │
/// │                        │ StoreAdapter (writes)      │ │
/// │                        └────────────────────────────┘ │
/// └───────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// The coordinator is `Sync`; share it with `Arc` and let each client
/// thread own its sessions. The tracker's lock is only held inside tracker
/// calls; store writes happen outside it. A granted session keeps its
/// grant until the write has finished, so no other session can save the
/// same record in between.
pub struct EditCoordinator {
    tracker: Arc<EditLockTracker>,
    translator: Arc<QueryTranslator>,
    validator: RecordValidator,
    next_session_id: AtomicU64,
    stats: EditStats,
}

impl EditCoordinator {
    /// Create a coordinator over a shared tracker and translator.
    pub fn new(tracker: Arc<EditLockTracker>, translator: Arc<QueryTranslator>) -> Self {
        Self {
            tracker,
            translator,
            validator: RecordValidator::new(),
            next_session_id: AtomicU64::new(1),
            stats: EditStats::new(),
        }
    }

    /// The shared edit-lock tracker.
    pub fn tracker(&self) -> &Arc<EditLockTracker> {
        &self.tracker
    }

    /// Edit statistics.
    pub fn stats(&self) -> &EditStats {
        &self.stats
    }

    fn adapter(&self) -> &StoreAdapter {
        self.translator.adapter()
    }

    fn allocate_session_id(&self) -> SessionId {
        SessionId(self.next_session_id.fetch_add(1, Ordering::Relaxed))
    }

    // ========================================================================
    // Public API: Open sessions
    // ========================================================================

    /// Open a persisted record for editing.
    ///
    /// The session is `Editing` with save/delete enabled if no other
    /// session has the record open, otherwise `Blocked` with both disabled
    /// and a conflict notice attached.
    ///
    /// # Errors
    /// - `Error::Unpersisted` if `record` has no identity; use
    ///   [`open_for_new`](Self::open_for_new) for new records.
    /// - `Error::NotFound` if the store has no record with that identity,
    ///   or cannot be reached to confirm one. No lock entry is created.
    pub fn open_for_edit(&self, record: Record) -> Result<EditSession> {
        let id = record.id().ok_or(Error::Unpersisted)?;
        if self.adapter().find_by_id(id).is_none() {
            tracing::debug!(%id, "open refused, record not in store");
            return Err(Error::NotFound(id));
        }
        let session_id = self.allocate_session_id();

        let (grant, registration) = self.tracker.register(id, session_id);
        match grant {
            EditGrant::Granted => {
                EditStats::bump(&self.stats.grants);
                tracing::debug!(%id, session = %session_id, "edit granted");
                Ok(EditSession::editing(session_id, record, registration))
            }
            EditGrant::Busy => {
                EditStats::bump(&self.stats.busy);
                tracing::info!(%id, session = %session_id, "record busy, session blocked");
                Ok(EditSession::blocked(session_id, record, registration))
            }
        }
    }

    /// Open a session that creates a new record.
    ///
    /// No identity exists yet, so there is nothing to contend over and the
    /// tracker is not consulted.
    pub fn open_for_new(&self) -> EditSession {
        let session_id = self.allocate_session_id();
        tracing::debug!(session = %session_id, "new record session");
        EditSession::new_record(session_id)
    }

    // ========================================================================
    // Public API: Close sessions
    // ========================================================================

    /// Validate and persist the session's record.
    ///
    /// On success the session is `Saved` and its grant is released. A
    /// rejected save leaves the session `Editing`, with the failures
    /// available from [`EditSession::field_errors`].
    ///
    /// # Errors
    /// - `Error::InvalidTransition` unless the session is `Editing`.
    /// - `Error::IdentityChanged` if the record no longer carries the
    ///   identity the session was opened on. Nothing is written.
    pub fn save(&self, session: &mut EditSession) -> Result<SaveOutcome> {
        self.require(session, SessionState::Editing, "save")?;
        self.require_identity(session)?;

        let mut errors = self.validator.validate(&session.record);
        if let Some(phone) = session.record.phone_number.as_deref() {
            if is_valid_phone_number(phone) && !self.is_phone_number_unique(&session.record, phone) {
                errors.push(FieldError::duplicate_phone_number());
            }
        }
        if !errors.is_empty() {
            return Ok(self.reject(session, errors));
        }

        let outcome = match self.adapter().persist(&session.record) {
            WriteOutcome::Written(id) => {
                if session.opened_on.is_none() {
                    session.record.assign_id(id);
                    session.opened_on = Some(id);
                }
                SaveOutcome::Saved(id)
            }
            WriteOutcome::Conflict { .. } => {
                // Another record took the phone number after our scan.
                return Ok(self.reject(session, vec![FieldError::duplicate_phone_number()]));
            }
            WriteOutcome::Skipped => SaveOutcome::NotStored,
        };

        session.field_errors.clear();
        session.close(SessionState::Saved);
        EditStats::bump(&self.stats.saves);
        tracing::debug!(session = %session.id, ?outcome, "session saved");
        Ok(outcome)
    }

    /// Abandon the session.
    ///
    /// An editing session flushes its record to the store before releasing
    /// its grant; a blocked session only withdraws its own registration. A
    /// new-record session has written nothing and writes nothing. If the
    /// record's identity was changed, nothing is flushed and the session
    /// still withdraws from the identity it was opened on.
    ///
    /// # Errors
    /// Returns `Error::InvalidTransition` if the session is already closed.
    pub fn cancel(&self, session: &mut EditSession) -> Result<()> {
        match session.state {
            SessionState::Editing if !session.identity_intact() => {
                tracing::warn!(
                    session = %session.id,
                    opened_on = ?session.opened_on,
                    found = ?session.record.id(),
                    "record identity changed, cancelling without flush"
                );
            }
            SessionState::Editing => {
                if session.opened_on.is_some() {
                    if let WriteOutcome::Conflict { field, value } =
                        self.adapter().persist(&session.record)
                    {
                        tracing::debug!(field, value = %value, "cancel flush rejected, discarding");
                    }
                }
            }
            SessionState::Blocked => {}
            _ => return Err(self.invalid(session, "cancel")),
        }

        session.close(SessionState::Cancelled);
        EditStats::bump(&self.stats.cancels);
        tracing::debug!(session = %session.id, "session cancelled");
        Ok(())
    }

    /// Delete the session's record from the store.
    ///
    /// Only the session holding the grant may delete. Deleting from a new
    /// record session discards it without touching the store.
    ///
    /// # Errors
    /// - `Error::InvalidTransition` unless the session is `Editing` and
    ///   holds the grant.
    /// - `Error::IdentityChanged` if the record no longer carries the
    ///   identity the session was opened on.
    pub fn delete(&self, session: &mut EditSession) -> Result<()> {
        self.require(session, SessionState::Editing, "delete")?;
        self.require_identity(session)?;

        if let Some(id) = session.opened_on {
            if self.tracker.holder(id) != Some(session.id) {
                return Err(self.invalid(session, "delete"));
            }
            self.adapter().delete(&session.record);
            EditStats::bump(&self.stats.deletes);
            tracing::info!(%id, session = %session.id, "record deleted");
        }

        session.close(SessionState::Deleted);
        Ok(())
    }

    // ========================================================================
    // Public API: Validation
    // ========================================================================

    /// Whether `phone` is free for `record` to use.
    ///
    /// Scans the store through the query translator. The record's own
    /// identity is excluded, so keeping one's current number is allowed.
    pub fn is_phone_number_unique(&self, record: &Record, phone: &str) -> bool {
        let candidates = self
            .translator
            .fetch(&Query::new().filter(Field::PhoneNumber, phone));

        !candidates.iter().any(|other| {
            other.phone_number.as_deref() == Some(phone)
                && (record.id().is_none() || other.id() != record.id())
        })
    }

    // ========================================================================
    // Internal
    // ========================================================================

    fn require_identity(&self, session: &EditSession) -> Result<()> {
        if session.identity_intact() {
            Ok(())
        } else {
            Err(Error::IdentityChanged {
                session: session.id.0,
                opened_on: session.opened_on,
                found: session.record.id(),
            })
        }
    }

    fn reject(&self, session: &mut EditSession, errors: Vec<FieldError>) -> SaveOutcome {
        EditStats::bump(&self.stats.rejected_saves);
        tracing::debug!(session = %session.id, failures = errors.len(), "save rejected");
        session.field_errors = errors.clone();
        SaveOutcome::Rejected(errors)
    }

    fn require(&self, session: &EditSession, state: SessionState, operation: &'static str) -> Result<()> {
        if session.state == state {
            Ok(())
        } else {
            Err(self.invalid(session, operation))
        }
    }

    fn invalid(&self, session: &EditSession, operation: &'static str) -> Error {
        Error::InvalidTransition {
            session: session.id.0,
            operation,
            state: session.state.name(),
        }
    }
}
