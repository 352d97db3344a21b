//! Edit coordination statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics tracked by the edit coordinator.
///
/// All fields are atomic so concurrent sessions can bump them without a
/// lock. `Ordering::Relaxed` is enough: counters are independent and only
/// read for reporting.
///
/// # Example
/// ```
/// use phonebook::EditStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = EditStats::new();
/// stats.grants.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().grants, 1);
/// ```
#[derive(Debug)]
pub struct EditStats {
    /// Sessions that were granted the edit on open.
    pub grants: AtomicU64,

    /// Sessions that found the record busy on open.
    pub busy: AtomicU64,

    /// Saves that reached the store.
    pub saves: AtomicU64,

    /// Saves rejected by validation or a uniqueness conflict.
    pub rejected_saves: AtomicU64,

    /// Sessions cancelled, from either editing or blocked.
    pub cancels: AtomicU64,

    /// Records deleted through a granted session.
    pub deletes: AtomicU64,
}

impl EditStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self {
            grants: AtomicU64::new(0),
            busy: AtomicU64::new(0),
            saves: AtomicU64::new(0),
            rejected_saves: AtomicU64::new(0),
            cancels: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
        }
    }

    /// Fraction of opens that were blocked (0.0 to 1.0).
    pub fn contention_rate(&self) -> f64 {
        self.snapshot().contention_rate()
    }

    /// Get a non-atomic copy of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            grants: self.grants.load(Ordering::Relaxed),
            busy: self.busy.load(Ordering::Relaxed),
            saves: self.saves.load(Ordering::Relaxed),
            rejected_saves: self.rejected_saves.load(Ordering::Relaxed),
            cancels: self.cancels.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.grants.store(0, Ordering::Relaxed);
        self.busy.store(0, Ordering::Relaxed);
        self.saves.store(0, Ordering::Relaxed);
        self.rejected_saves.store(0, Ordering::Relaxed);
        self.cancels.store(0, Ordering::Relaxed);
        self.deletes.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for EditStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of edit statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub grants: u64,
    pub busy: u64,
    pub saves: u64,
    pub rejected_saves: u64,
    pub cancels: u64,
    pub deletes: u64,
}

impl StatsSnapshot {
    /// Fraction of opens that were blocked (0.0 to 1.0).
    pub fn contention_rate(&self) -> f64 {
        let total = self.grants + self.busy;
        if total == 0 {
            0.0
        } else {
            self.busy as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ grants: {}, busy: {}, saves: {}, rejected: {}, contention: {:.2}% }}",
            self.grants,
            self.busy,
            self.saves,
            self.rejected_saves,
            self.contention_rate() * 100.0
        )
    }
}
