//! Printed-code history.
//!
//! # Table
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `codes` | monotonic `u64` row id | JSON body (code, printed_at) |
//!
//! Rows are append-only. Each [`HistoryStore::append`] call writes all of its
//! codes under one lock and, for redb, one write transaction.

use crate::code::Code;
use crate::error::{PersistenceError, PersistenceResult};
use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

const CODES_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("codes");

/// One history row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: u64,
    pub code: Code,
    pub printed_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct StoredRow {
    code: String,
    printed_at: DateTime<Utc>,
}

/// Append-only log of printed codes.
pub trait HistoryStore: Send + Sync {
    /// Appends `codes` in order as one atomic write.
    fn append(&self, codes: &[Code]) -> PersistenceResult<()>;

    /// Latest rows first.
    fn recent_entries(&self, limit: usize) -> PersistenceResult<Vec<HistoryEntry>>;

    fn recent_codes(&self, limit: usize) -> PersistenceResult<Vec<Code>> {
        Ok(self
            .recent_entries(limit)?
            .into_iter()
            .map(|entry| entry.code)
            .collect())
    }
}

/// Process-local history.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    rows: Mutex<Vec<HistoryEntry>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistory {
    fn append(&self, codes: &[Code]) -> PersistenceResult<()> {
        let mut rows = self.rows.lock().map_err(|_| PersistenceError::Poisoned)?;
        let now = Utc::now();
        let mut next = rows.last().map_or(1, |row| row.id + 1);
        for code in codes {
            rows.push(HistoryEntry {
                id: next,
                code: code.clone(),
                printed_at: now,
            });
            next += 1;
        }
        Ok(())
    }

    fn recent_entries(&self, limit: usize) -> PersistenceResult<Vec<HistoryEntry>> {
        let rows = self.rows.lock().map_err(|_| PersistenceError::Poisoned)?;
        Ok(rows.iter().rev().take(limit).cloned().collect())
    }
}

/// History backed by a redb file.
#[derive(Clone)]
pub struct RedbHistory {
    db: Arc<Database>,
    write_lock: Arc<Mutex<()>>,
}

impl RedbHistory {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> PersistenceResult<Self> {
        let path = path.as_ref();
        let db = Database::create(path)?;
        info!(path = %path.display(), "history database opened");
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> PersistenceResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> PersistenceResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CODES_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }
}

impl HistoryStore for RedbHistory {
    fn append(&self, codes: &[Code]) -> PersistenceResult<()> {
        let _guard = self.write_lock.lock().map_err(|_| PersistenceError::Poisoned)?;

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(CODES_TABLE)?;
            let mut next = table.last()?.map_or(1, |(key, _)| key.value() + 1);
            let printed_at = Utc::now();
            for code in codes {
                let body = serde_json::to_vec(&StoredRow {
                    code: code.to_string(),
                    printed_at,
                })?;
                table.insert(next, body.as_slice())?;
                next += 1;
            }
        }
        txn.commit()?;
        debug!(count = codes.len(), "history rows appended");
        Ok(())
    }

    fn recent_entries(&self, limit: usize) -> PersistenceResult<Vec<HistoryEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CODES_TABLE)?;

        let mut entries = Vec::new();
        for result in table.iter()?.rev() {
            if entries.len() >= limit {
                break;
            }
            let (key, value) = result?;
            let row: StoredRow = serde_json::from_slice(value.value())?;
            // empty codes only appear in hand-edited files
            if let Ok(code) = Code::new(row.code) {
                entries.push(HistoryEntry {
                    id: key.value(),
                    code,
                    printed_at: row.printed_at,
                });
            }
        }
        Ok(entries)
    }
}
