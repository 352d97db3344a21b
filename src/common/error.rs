//! Error types for the phonebook backend.

use thiserror::Error;

use crate::common::RecordId;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in the phonebook backend.
///
/// Store adapters return these from every operation. The edit coordinator
/// never lets them escape as-is: it folds each one into the outcome
/// taxonomy described by [`ErrorKind`].
#[derive(Debug, Error)]
pub enum Error {
    /// The backing store could not be reached or failed mid-operation.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A uniqueness constraint would be violated by the write.
    #[error("{field} '{value}' is already used by another record")]
    Conflict {
        /// Attribute carrying the constraint.
        field: &'static str,
        /// The offending value.
        value: String,
    },

    /// The record targeted by an update does not exist.
    #[error("record {0} not found")]
    NotFound(RecordId),

    /// A constraint or configuration named an attribute that records don't have.
    #[error("unknown record field: '{0}'")]
    UnknownField(String),

    /// A stored line failed its checksum or could not be decoded.
    #[error("corrupted store at line {line}: {reason}")]
    Corrupted { line: usize, reason: String },

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The session is not in a state that allows the requested operation.
    #[error("session {session} cannot {operation} while {state}")]
    InvalidTransition {
        session: u64,
        operation: &'static str,
        state: &'static str,
    },

    /// The session's record no longer carries the identity it was opened on.
    #[error("session {session} was opened on {opened_on:?} but holds record {found:?}")]
    IdentityChanged {
        session: u64,
        opened_on: Option<RecordId>,
        found: Option<RecordId>,
    },

    /// The attribute cannot be written through the generic setter.
    #[error("field '{0}' is read-only")]
    ReadOnlyField(&'static str),

    /// A record without an identity was passed where a persisted one is required.
    #[error("record has no identity")]
    Unpersisted,

    /// I/O error from the file-backed store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Outcome classes a caller of the store ever has to distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Store unreachable; degrade to an empty result or a no-op.
    BackendUnavailable,
    /// Uniqueness violation; surface as a field-level validation failure.
    Conflict,
    /// Target absent; silent no-op.
    NotFound,
    /// Caller error (bad field name, bad transition, bad config).
    Usage,
}

impl Error {
    /// Classify this error into the store outcome taxonomy.
    ///
    /// I/O, serialization and corruption failures all mean the store could
    /// not serve the request, so they classify as `BackendUnavailable`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::BackendUnavailable(_)
            | Error::Io(_)
            | Error::Serialization(_)
            | Error::Corrupted { .. } => ErrorKind::BackendUnavailable,
            Error::Conflict { .. } => ErrorKind::Conflict,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::UnknownField(_)
            | Error::Config(_)
            | Error::InvalidTransition { .. }
            | Error::IdentityChanged { .. }
            | Error::ReadOnlyField(_)
            | Error::Unpersisted => ErrorKind::Usage,
        }
    }
}
