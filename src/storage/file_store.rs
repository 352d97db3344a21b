//! File Store - a durable, single-file record store.
//!
//! The [`FileRecordStore`] keeps the whole record set in memory and mirrors
//! it to one file after every mutation:
//! - Line 1 holds the table header (next identity to allocate)
//! - Every following line holds one record
//!
//! Each line is checksummed (see [`line`](super::line)).

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::common::{Error, RecordId, Result};
use crate::record::Record;
use crate::storage::line;
use crate::storage::table::{RecordTable, TableHeader};
use crate::storage::RecordStore;

/// A record store persisted to a single file.
///
/// # File Layout
/// ```text
/// ┌──────────────────────────────────────────────┐
/// │ 1a2b3c4d {"nextId":4}                        │  header
/// │ 5e6f7a8b {"id":1,"firstName":"Ada",...}      │  record
/// │ 9c0d1e2f {"id":3,"firstName":"Alan",...}     │  record
/// └──────────────────────────────────────────────┘
/// ```
///
/// # Durability
/// A mutation is applied to a copy of the table, the copy is written to a
/// sibling temp file, `fsync`ed, and renamed over the store file. Only then
/// does the in-memory table move forward, so a failed write leaves both the
/// file and the table at the previous state.
///
/// # Thread Safety
/// All access is serialized by one internal `Mutex`.
pub struct FileRecordStore {
    path: PathBuf,
    table: Mutex<RecordTable>,
}

impl FileRecordStore {
    /// Create a new, empty store file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;

        let store = Self {
            path,
            table: Mutex::new(RecordTable::new()),
        };
        store.write_file(&store.table.lock())?;

        tracing::info!(path = %store.path.display(), "created record store");
        Ok(store)
    }

    /// Open an existing store file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist, or `Error::Corrupted` if
    /// any line fails its checksum or cannot be decoded.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let table = Self::read_file(&path)?;

        tracing::info!(
            path = %path.display(),
            records = table.len(),
            "opened record store"
        );
        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    /// Open an existing store file, or create it if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Path of the backing file.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Internal: file format
    // ========================================================================

    fn read_file(path: &Path) -> Result<RecordTable> {
        let reader = BufReader::new(File::open(path)?);
        let mut lines = reader.lines().enumerate();

        let header: TableHeader = match lines.next() {
            Some((_, raw)) => serde_json::from_str(line::decode(&raw?, 1)?)
                .map_err(|e| corrupted(1, e))?,
            // Empty file: created but never written.
            None => TableHeader {
                next_id: RecordId::FIRST,
            },
        };

        let mut records = Vec::new();
        for (index, raw) in lines {
            let raw = raw?;
            let line_no = index + 1;
            if raw.is_empty() {
                continue;
            }
            let record: Record =
                serde_json::from_str(line::decode(&raw, line_no)?).map_err(|e| corrupted(line_no, e))?;
            if record.id().is_none() {
                return Err(Error::Corrupted {
                    line: line_no,
                    reason: "record without identity".to_string(),
                });
            }
            records.push(record);
        }

        Ok(RecordTable::from_parts(header, records))
    }

    fn write_file(&self, table: &RecordTable) -> Result<()> {
        let tmp_path = self.path.with_extension("tmp");
        {
            let mut file = File::create(&tmp_path)?;
            writeln!(file, "{}", line::encode(&serde_json::to_string(&table.header())?, 1)?)?;
            for (index, record) in table.iter().enumerate() {
                let encoded = line::encode(&serde_json::to_string(record)?, index + 2)?;
                writeln!(file, "{}", encoded)?;
            }
            file.sync_all()?; // fsync for durability
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Apply `mutation` to a copy of the table, persist it, then commit it.
    fn mutate<T>(&self, mutation: impl FnOnce(&mut RecordTable) -> Result<T>) -> Result<T> {
        let mut table = self.table.lock();
        let mut next = table.clone();
        let value = mutation(&mut next)?;
        self.write_file(&next)?;
        *table = next;
        Ok(value)
    }
}

fn corrupted(line: usize, err: serde_json::Error) -> Error {
    Error::Corrupted {
        line,
        reason: err.to_string(),
    }
}

impl RecordStore for FileRecordStore {
    fn fetch_all(&self) -> Result<Vec<Record>> {
        Ok(self.table.lock().iter().cloned().collect())
    }

    fn persist(&self, record: &Record) -> Result<RecordId> {
        self.mutate(|table| table.persist(record))
    }

    fn delete(&self, record: &Record) -> Result<()> {
        let Some(id) = record.id() else {
            return Ok(());
        };
        if self.table.lock().get(id).is_none() {
            return Ok(());
        }
        self.mutate(|table| {
            table.remove(id);
            Ok(())
        })
    }

    fn find_by_id(&self, id: RecordId) -> Result<Option<Record>> {
        Ok(self.table.lock().get(id).cloned())
    }
}
