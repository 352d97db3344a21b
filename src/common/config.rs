//! Configuration for the phonebook backend.
//!
//! The only decision configuration makes is which [`RecordStore`] to build.
//! Everything downstream of the store is the same regardless of backend.
//!
//! ```toml
//! [store]
//! backend = "file"
//! path = "/var/lib/phonebook/records.db"
//! ```
//!
//! [`RecordStore`]: crate::storage::RecordStore

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

/// Default file name used by the file backend when no path is configured.
pub const DEFAULT_STORE_FILE: &str = "phonebook.db";

/// Which record store implementation to construct.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BackendKind {
    /// Volatile, process-local store.
    #[default]
    Memory,
    /// Checksummed single-file store.
    File,
}

impl From<String> for BackendKind {
    /// Unknown backend names fall back to the in-memory store.
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "file" | "db" => BackendKind::File,
            "memory" | "inmemory" => BackendKind::Memory,
            other => {
                tracing::warn!(backend = other, "unknown store backend, using in-memory store");
                BackendKind::Memory
            }
        }
    }
}

impl From<BackendKind> for String {
    fn from(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Memory => "memory".to_string(),
            BackendKind::File => "file".to_string(),
        }
    }
}

/// Store section of the configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: BackendKind,
    /// Location of the store file. Ignored by the in-memory backend.
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// In-memory store configuration.
    pub fn memory() -> Self {
        Self::default()
    }

    /// File-backed store configuration.
    pub fn file<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            backend: BackendKind::File,
            path: Some(path.into()),
        }
    }

    /// Resolved store file path for the file backend.
    pub fn file_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE))
    }
}

/// Top-level configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
}

impl AppConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("invalid configuration: {}", e)))
    }

    /// Read and parse configuration from a file.
    ///
    /// # Errors
    /// Returns `Error::Config` if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize this configuration to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_is_memory() {
        let config = AppConfig::default();
        assert_eq!(config.store.backend, BackendKind::Memory);
        assert!(config.store.path.is_none());
    }

    #[test]
    fn test_parse_file_backend() {
        let config = AppConfig::from_toml_str(
            r#"
            [store]
            backend = "file"
            path = "/tmp/records.db"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.backend, BackendKind::File);
        assert_eq!(config.store.file_path(), PathBuf::from("/tmp/records.db"));
    }

    #[test]
    fn test_backend_aliases_and_fallback() {
        let config = AppConfig::from_toml_str("[store]\nbackend = \"DB\"\n").unwrap();
        assert_eq!(config.store.backend, BackendKind::File);

        let config = AppConfig::from_toml_str("[store]\nbackend = \"inmemory\"\n").unwrap();
        assert_eq!(config.store.backend, BackendKind::Memory);

        let config = AppConfig::from_toml_str("[store]\nbackend = \"postgres\"\n").unwrap();
        assert_eq!(config.store.backend, BackendKind::Memory);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml_str("[store\nbackend=").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("phonebook.toml");

        let config = AppConfig {
            store: StoreConfig::file(dir.path().join("records.db")),
        };
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        assert_eq!(AppConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempdir().unwrap();
        let err = AppConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
