//! Edit-Lock Tracker - advisory per-record edit locks.
//!
//! The [`EditLockTracker`] counts how many sessions currently have each
//! record open. The first session to open an idle record is granted the
//! edit; every session that opens it while the count is non-zero is told
//! it is busy. Nothing ever waits: the answer is immediate.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::common::RecordId;
use crate::edit::SessionId;

/// Outcome of [`EditLockTracker::begin_edit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditGrant {
    /// The caller is the only open session and may save or delete.
    Granted,
    /// Another session has the record open.
    Busy,
}

/// Lock state for one record identity.
///
/// The open count is `sessions.len()`. Entries are created on first use
/// and never removed; an idle entry just has no sessions.
#[derive(Debug, Default)]
struct LockEntry {
    /// Session holding the grant, if it is still open.
    holder: Option<SessionId>,
    /// Every session that has begun and not yet ended an edit.
    sessions: Vec<SessionId>,
}

/// Tracks open edit sessions per record identity.
///
/// # Thread Safety
/// One `Mutex` guards the whole map. Every operation holds it only for the
/// map update itself, so the tracker's operations are linearizable with
/// respect to each other and no caller ever holds it across store I/O.
///
/// # Ownership
/// The tracker remembers which sessions registered on each identity.
/// `end_edit` from a session that isn't registered (one that already ended,
/// or never began) changes nothing, so a blocked session can only ever
/// withdraw its own registration and never the holder's.
#[derive(Debug)]
pub struct EditLockTracker {
    entries: Mutex<HashMap<RecordId, LockEntry>>,
}

impl EditLockTracker {
    /// Create a tracker with no entries.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Register `session` as editing `id`.
    ///
    /// Returns `Granted` if no other session had `id` open, `Busy`
    /// otherwise. A busy session still counts as open until it calls
    /// [`end_edit`](Self::end_edit). Calling this twice for the same session
    /// returns the original answer without counting it again.
    pub fn begin_edit(&self, id: RecordId, session: SessionId) -> EditGrant {
        let mut entries = self.entries.lock();
        let entry = entries.entry(id).or_default();

        if entry.sessions.contains(&session) {
            return if entry.holder == Some(session) {
                EditGrant::Granted
            } else {
                EditGrant::Busy
            };
        }

        let grant = if entry.sessions.is_empty() {
            entry.holder = Some(session);
            EditGrant::Granted
        } else {
            EditGrant::Busy
        };
        entry.sessions.push(session);
        grant
    }

    /// Register `session` on `id` and return a guard that withdraws the
    /// registration when dropped.
    ///
    /// Used by the coordinator so that a session abandoned without being
    /// closed never keeps its record busy.
    pub(crate) fn register(
        self: &Arc<Self>,
        id: RecordId,
        session: SessionId,
    ) -> (EditGrant, EditRegistration) {
        let grant = self.begin_edit(id, session);
        let registration = EditRegistration {
            tracker: Arc::clone(self),
            record_id: id,
            session,
            released: false,
        };
        (grant, registration)
    }

    /// Withdraw `session` from `id`. Returns the remaining open count.
    ///
    /// The count never drops below zero, and a session that isn't
    /// registered is ignored.
    pub fn end_edit(&self, id: RecordId, session: SessionId) -> usize {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(&id) else {
            return 0;
        };

        if let Some(pos) = entry.sessions.iter().position(|s| *s == session) {
            entry.sessions.remove(pos);
        }
        if entry.holder == Some(session) {
            entry.holder = None;
        }

        let remaining = entry.sessions.len();
        if remaining == 0 {
            tracing::debug!(%id, "record available for editing");
        }
        remaining
    }

    /// Number of sessions that have `id` open. Zero for unseen identities.
    pub fn open_count(&self, id: RecordId) -> usize {
        self.entries
            .lock()
            .get(&id)
            .map_or(0, |entry| entry.sessions.len())
    }

    /// The session holding the grant on `id`, if it is still open.
    pub fn holder(&self, id: RecordId) -> Option<SessionId> {
        self.entries.lock().get(&id).and_then(|entry| entry.holder)
    }

    /// Whether `begin_edit` on `id` would currently be granted.
    pub fn is_available(&self, id: RecordId) -> bool {
        self.open_count(id) == 0
    }

    /// Number of identities that have ever been tracked.
    pub fn tracked_count(&self) -> usize {
        self.entries.lock().len()
    }
}

impl Default for EditLockTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// One session's registration on one record.
///
/// Calls `end_edit` exactly once: through [`release`](Self::release), or on
/// drop if the session was abandoned while still open.
#[derive(Debug)]
pub(crate) struct EditRegistration {
    /// Tracker to withdraw from.
    tracker: Arc<EditLockTracker>,
    /// Identity the session registered on.
    record_id: RecordId,
    session: SessionId,
    released: bool,
}

impl EditRegistration {
    /// Identity this registration holds open.
    #[inline]
    pub(crate) fn record_id(&self) -> RecordId {
        self.record_id
    }

    /// Withdraw now. Returns the remaining open count.
    pub(crate) fn release(mut self) -> usize {
        self.released = true;
        self.tracker.end_edit(self.record_id, self.session)
    }
}

impl Drop for EditRegistration {
    fn drop(&mut self) {
        if !self.released {
            tracing::debug!(
                id = %self.record_id,
                session = %self.session,
                "open session dropped, withdrawing registration"
            );
            self.tracker.end_edit(self.record_id, self.session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const ID: RecordId = RecordId(1);

    #[test]
    fn test_unseen_identity_is_available() {
        let tracker = EditLockTracker::new();
        assert_eq!(tracker.open_count(ID), 0);
        assert!(tracker.is_available(ID));
        assert_eq!(tracker.holder(ID), None);
        assert_eq!(tracker.tracked_count(), 0);
    }

    #[test]
    fn test_granted_then_busy_then_floor() {
        let tracker = EditLockTracker::new();
        let (a, b) = (SessionId(1), SessionId(2));

        assert_eq!(tracker.begin_edit(ID, a), EditGrant::Granted);
        assert_eq!(tracker.begin_edit(ID, b), EditGrant::Busy);
        assert_eq!(tracker.open_count(ID), 2);

        assert_eq!(tracker.end_edit(ID, a), 1);
        assert_eq!(tracker.end_edit(ID, b), 0);

        // Third end leaves the count at zero.
        assert_eq!(tracker.end_edit(ID, b), 0);
        assert_eq!(tracker.open_count(ID), 0);

        // The entry stays around and is reused.
        assert_eq!(tracker.tracked_count(), 1);
        assert_eq!(tracker.begin_edit(ID, SessionId(3)), EditGrant::Granted);
    }

    #[test]
    fn test_end_edit_on_unseen_identity() {
        let tracker = EditLockTracker::new();
        assert_eq!(tracker.end_edit(RecordId(99), SessionId(1)), 0);
        assert_eq!(tracker.tracked_count(), 0);
    }

    #[test]
    fn test_blocked_session_cannot_release_holder() {
        let tracker = EditLockTracker::new();
        let (holder, blocked) = (SessionId(1), SessionId(2));

        tracker.begin_edit(ID, holder);
        tracker.begin_edit(ID, blocked);

        // The blocked session ends twice; only its own registration goes.
        tracker.end_edit(ID, blocked);
        tracker.end_edit(ID, blocked);

        assert_eq!(tracker.open_count(ID), 1);
        assert_eq!(tracker.holder(ID), Some(holder));
        assert_eq!(tracker.begin_edit(ID, SessionId(3)), EditGrant::Busy);
    }

    #[test]
    fn test_observer_keeps_record_busy_after_holder_leaves() {
        let tracker = EditLockTracker::new();
        tracker.begin_edit(ID, SessionId(1));
        tracker.begin_edit(ID, SessionId(2));

        tracker.end_edit(ID, SessionId(1));
        assert_eq!(tracker.holder(ID), None);
        assert_eq!(tracker.begin_edit(ID, SessionId(3)), EditGrant::Busy);
    }

    #[test]
    fn test_begin_edit_is_idempotent_per_session() {
        let tracker = EditLockTracker::new();
        assert_eq!(tracker.begin_edit(ID, SessionId(1)), EditGrant::Granted);
        assert_eq!(tracker.begin_edit(ID, SessionId(1)), EditGrant::Granted);
        assert_eq!(tracker.open_count(ID), 1);
    }

    #[test]
    fn test_identities_are_independent() {
        let tracker = EditLockTracker::new();
        assert_eq!(tracker.begin_edit(RecordId(1), SessionId(1)), EditGrant::Granted);
        assert_eq!(tracker.begin_edit(RecordId(2), SessionId(2)), EditGrant::Granted);
    }

    #[test]
    fn test_registration_withdraws_on_drop() {
        let tracker = Arc::new(EditLockTracker::new());

        let (grant, registration) = tracker.register(ID, SessionId(1));
        assert_eq!(grant, EditGrant::Granted);
        assert_eq!(tracker.holder(ID), Some(SessionId(1)));

        drop(registration);
        assert!(tracker.is_available(ID));
        assert_eq!(tracker.holder(ID), None);
    }

    #[test]
    fn test_registration_release_ends_once() {
        let tracker = Arc::new(EditLockTracker::new());
        let (_, holder) = tracker.register(ID, SessionId(1));
        let (grant, observer) = tracker.register(ID, SessionId(2));
        assert_eq!(grant, EditGrant::Busy);

        assert_eq!(observer.release(), 1);
        assert_eq!(tracker.holder(ID), Some(SessionId(1)));
        assert_eq!(holder.release(), 0);
    }

    #[test]
    fn test_concurrent_begin_edit_grants_exactly_one() {
        let tracker = Arc::new(EditLockTracker::new());
        let mut handles = vec![];

        for i in 0..16 {
            let tracker_clone = Arc::clone(&tracker);
            handles.push(thread::spawn(move || {
                tracker_clone.begin_edit(ID, SessionId(i))
            }));
        }

        let grants: Vec<EditGrant> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let granted = grants.iter().filter(|g| **g == EditGrant::Granted).count();
        assert_eq!(granted, 1);
        assert_eq!(tracker.open_count(ID), 16);
    }
}
