//! Common types and utilities shared across the phonebook backend.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration (store selection)
//! - Error types
//! - Identifiers (RecordId)

pub mod config;
pub mod error;
mod record_id;

pub use config::{AppConfig, BackendKind, StoreConfig};
pub use error::{Error, ErrorKind, Result};
pub use record_id::RecordId;
