//! Edit sessions - one client's attempt to edit one record.

use std::fmt;
use std::time::Duration;

use crate::common::RecordId;
use crate::edit::lock_tracker::EditRegistration;
use crate::record::{FieldError, Record};

/// Message shown to a client whose edit was blocked by another session.
pub const CONFLICT_MESSAGE: &str = "Someone else is updating this record";

/// How long a client should display a conflict notice.
pub const NOTICE_DURATION: Duration = Duration::from_millis(2000);

/// Identifies an edit session. Allocated by the coordinator, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session({})", self.0)
    }
}

/// Where a session is in its lifecycle.
///
/// ```text
/// open (granted) ──▶ Editing ──save────▶ Saved
///                       ├──────cancel──▶ Cancelled
///                       └──────delete──▶ Deleted
/// open (busy) ─────▶ Blocked ──cancel──▶ Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Editing,
    Blocked,
    Saved,
    Cancelled,
    Deleted,
}

impl SessionState {
    /// Lowercase state name, as used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            SessionState::Editing => "editing",
            SessionState::Blocked => "blocked",
            SessionState::Saved => "saved",
            SessionState::Cancelled => "cancelled",
            SessionState::Deleted => "deleted",
        }
    }

    /// Whether the session has finished and accepts no more operations.
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            SessionState::Saved | SessionState::Cancelled | SessionState::Deleted
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which mutating actions the client should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordances {
    pub save_enabled: bool,
    pub delete_enabled: bool,
}

impl Affordances {
    /// Save and delete both offered.
    pub const ENABLED: Affordances = Affordances {
        save_enabled: true,
        delete_enabled: true,
    };

    /// Read-only view.
    pub const DISABLED: Affordances = Affordances {
        save_enabled: false,
        delete_enabled: false,
    };
}

/// A client-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub duration: Duration,
}

impl Notice {
    /// The notice shown to a session that found its record busy.
    pub fn conflict() -> Self {
        Self {
            message: CONFLICT_MESSAGE.to_string(),
            duration: NOTICE_DURATION,
        }
    }
}

/// A client's edit session on a single record.
///
/// Sessions are created by [`EditCoordinator`](crate::edit::EditCoordinator)
/// and every transition goes through it. The record is only mutable while
/// the session is [`Editing`](SessionState::Editing).
///
/// A session remembers the identity it was opened on. The coordinator
/// refuses to save or delete once the record's identity no longer matches
/// it. Dropping a session that is still open withdraws it from the edit-lock
/// tracker, like closing it would.
#[derive(Debug)]
pub struct EditSession {
    pub(crate) id: SessionId,
    pub(crate) state: SessionState,
    pub(crate) record: Record,
    /// Identity the session was opened on. `None` for new-record sessions.
    pub(crate) opened_on: Option<RecordId>,
    pub(crate) affordances: Affordances,
    pub(crate) notice: Option<Notice>,
    pub(crate) field_errors: Vec<FieldError>,
    /// Tracker registration, held until the session closes.
    registration: Option<EditRegistration>,
}

impl EditSession {
    /// A session on a new, identity-less record. Not tracked.
    pub(crate) fn new_record(id: SessionId) -> Self {
        Self {
            id,
            state: SessionState::Editing,
            record: Record::new(),
            opened_on: None,
            affordances: Affordances::ENABLED,
            notice: None,
            field_errors: Vec::new(),
            registration: None,
        }
    }

    /// A session that was granted the edit on a persisted record.
    pub(crate) fn editing(id: SessionId, record: Record, registration: EditRegistration) -> Self {
        Self {
            id,
            state: SessionState::Editing,
            record,
            opened_on: Some(registration.record_id()),
            affordances: Affordances::ENABLED,
            notice: None,
            field_errors: Vec::new(),
            registration: Some(registration),
        }
    }

    /// A session that found its record busy.
    pub(crate) fn blocked(id: SessionId, record: Record, registration: EditRegistration) -> Self {
        Self {
            id,
            state: SessionState::Blocked,
            record,
            opened_on: Some(registration.record_id()),
            affordances: Affordances::DISABLED,
            notice: Some(Notice::conflict()),
            field_errors: Vec::new(),
            registration: Some(registration),
        }
    }

    /// The session's identifier.
    #[inline]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The record as this session currently sees it.
    #[inline]
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Mutable access to the record, only while editing.
    pub fn record_mut(&mut self) -> Option<&mut Record> {
        match self.state {
            SessionState::Editing => Some(&mut self.record),
            _ => None,
        }
    }

    /// Identity the session was opened on, `None` for a new record.
    #[inline]
    pub fn opened_on(&self) -> Option<RecordId> {
        self.opened_on
    }

    /// Whether the record still carries the identity the session was
    /// opened on.
    pub fn identity_intact(&self) -> bool {
        self.record.id() == self.opened_on
    }

    /// Which actions the client should offer.
    #[inline]
    pub fn affordances(&self) -> Affordances {
        self.affordances
    }

    /// The conflict notice, if the session was blocked on entry.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Field errors from the most recent rejected save.
    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    /// Whether the session is creating a record rather than editing one.
    pub fn is_new(&self) -> bool {
        self.opened_on.is_none()
    }

    /// Move to a closed state, withdraw from the tracker and re-enable
    /// affordances for the next session.
    pub(crate) fn close(&mut self, state: SessionState) {
        debug_assert!(state.is_closed());
        if let Some(registration) = self.registration.take() {
            registration.release();
        }
        self.state = state;
        self.affordances = Affordances::ENABLED;
    }
}
