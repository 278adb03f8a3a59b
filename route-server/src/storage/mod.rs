//! redb-based storage for the shared dataset
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `dataset` | `"cards"` / `"ops"` / `"centers"` | JSON array | The canonical dataset |
//! | `meta` | `"revision"` | `u64` | Commit counter |
//!
//! # Consistency
//!
//! Readers use a read transaction (MVCC snapshot) and never observe a
//! partially written dataset. [`DatasetStorage::update`] reads, transforms and
//! writes inside a single write transaction; redb admits one writer at a time,
//! so concurrent submissions are serialized and none is lost wholesale.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::Dataset;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for dataset sections: key = section name, value = JSON array
const DATASET_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("dataset");

/// Table for metadata counters
const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("meta");

const CARDS_KEY: &str = "cards";
const OPS_KEY: &str = "ops";
const CENTERS_KEY: &str = "centers";
const REVISION_KEY: &str = "revision";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage task failed: {0}")]
    Task(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Dataset storage backed by redb
#[derive(Clone)]
pub struct DatasetStorage {
    db: Arc<Database>,
}

impl DatasetStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DATASET_TABLE)?;
            let mut meta = write_txn.open_table(META_TABLE)?;
            if meta.get(REVISION_KEY)?.is_none() {
                meta.insert(REVISION_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Load the last committed dataset (empty if nothing was ever written)
    pub fn load(&self) -> StorageResult<Dataset> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DATASET_TABLE)?;
        Ok(Dataset {
            cards: read_section(&table, CARDS_KEY)?,
            ops: read_section(&table, OPS_KEY)?,
            centers: read_section(&table, CENTERS_KEY)?,
        })
    }

    /// Number of committed updates
    pub fn revision(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(META_TABLE)?;
        Ok(table
            .get(REVISION_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0))
    }

    /// Atomic read-modify-write of the whole dataset
    ///
    /// `f` receives the currently committed dataset and returns the dataset to
    /// store plus a value handed back to the caller. If `f` fails, the write
    /// transaction is dropped without committing and nothing changes.
    pub fn update<T, E, F>(&self, f: F) -> Result<(Dataset, T), E>
    where
        F: FnOnce(Dataset) -> Result<(Dataset, T), E>,
        E: From<StorageError>,
    {
        let write_txn = self.db.begin_write().map_err(StorageError::from)?;
        let current = read_dataset_txn(&write_txn)?;
        let (next, extra) = f(current)?;
        write_dataset_txn(&write_txn, &next)?;
        write_txn.commit().map_err(StorageError::from)?;
        Ok((next, extra))
    }
}

fn read_section<T, Tbl>(table: &Tbl, key: &str) -> StorageResult<Vec<T>>
where
    T: DeserializeOwned,
    Tbl: ReadableTable<&'static str, &'static [u8]>,
{
    match table.get(key)? {
        Some(guard) => Ok(serde_json::from_slice(guard.value())?),
        None => Ok(Vec::new()),
    }
}

fn read_dataset_txn(txn: &WriteTransaction) -> StorageResult<Dataset> {
    let table = txn.open_table(DATASET_TABLE)?;
    Ok(Dataset {
        cards: read_section(&table, CARDS_KEY)?,
        ops: read_section(&table, OPS_KEY)?,
        centers: read_section(&table, CENTERS_KEY)?,
    })
}

fn write_section<T: Serialize>(
    table: &mut redb::Table<'_, &'static str, &'static [u8]>,
    key: &str,
    items: &[T],
) -> StorageResult<()> {
    let bytes = serde_json::to_vec(items)?;
    table.insert(key, bytes.as_slice())?;
    Ok(())
}

fn write_dataset_txn(txn: &WriteTransaction, data: &Dataset) -> StorageResult<()> {
    {
        let mut table = txn.open_table(DATASET_TABLE)?;
        write_section(&mut table, CARDS_KEY, &data.cards)?;
        write_section(&mut table, OPS_KEY, &data.ops)?;
        write_section(&mut table, CENTERS_KEY, &data.centers)?;
    }
    let mut meta = txn.open_table(META_TABLE)?;
    let revision = meta
        .get(REVISION_KEY)?
        .map(|guard| guard.value())
        .unwrap_or(0);
    meta.insert(REVISION_KEY, revision + 1)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Card, WorkCenter};

    fn sample() -> Dataset {
        Dataset {
            cards: vec![Card {
                id: "card_1".into(),
                name: "Shaft".into(),
                ..Default::default()
            }],
            centers: vec![WorkCenter {
                id: "wc_1".into(),
                name: "Machining".into(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_fresh_storage_is_empty() {
        let storage = DatasetStorage::open_in_memory().unwrap();
        assert!(storage.load().unwrap().is_empty());
        assert_eq!(storage.revision().unwrap(), 0);
    }

    #[test]
    fn test_update_commits_and_bumps_revision() {
        let storage = DatasetStorage::open_in_memory().unwrap();
        let (saved, ()) = storage
            .update(|_| Ok::<_, StorageError>((sample(), ())))
            .unwrap();
        assert_eq!(storage.load().unwrap(), saved);
        assert_eq!(storage.revision().unwrap(), 1);

        storage
            .update(|mut data| {
                data.cards[0].name = "Gear".into();
                Ok::<_, StorageError>((data, ()))
            })
            .unwrap();
        assert_eq!(storage.load().unwrap().cards[0].name, "Gear");
        assert_eq!(storage.revision().unwrap(), 2);
    }

    #[test]
    fn test_failed_update_writes_nothing() {
        let storage = DatasetStorage::open_in_memory().unwrap();
        storage
            .update(|_| Ok::<_, StorageError>((sample(), ())))
            .unwrap();

        let result: Result<(Dataset, ()), StorageError> = storage.update(|mut data| {
            data.cards.clear();
            Err(StorageError::Task("rejected".into()))
        });
        assert!(result.is_err());
        assert_eq!(storage.load().unwrap(), sample());
        assert_eq!(storage.revision().unwrap(), 1);
    }

    #[test]
    fn test_reopen_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.redb");
        {
            let storage = DatasetStorage::open(&path).unwrap();
            storage
                .update(|_| Ok::<_, StorageError>((sample(), ())))
                .unwrap();
        }
        let storage = DatasetStorage::open(&path).unwrap();
        assert_eq!(storage.load().unwrap(), sample());
    }
}
