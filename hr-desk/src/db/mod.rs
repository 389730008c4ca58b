//! 存储层
//!
//! Client-local key-value storage. Every collection owns exactly one key
//! and its value is the JSON snapshot of the whole collection.
//!
//! Backends:
//! - [`MemoryStore`] - process memory (tests, `HR_STORAGE=memory`)
//! - [`FileStore`] - one `<key>.json` file per key under the data dir
//! - [`RedbStore`] - embedded redb database, single `kv` table

pub mod file;
pub mod keys;
pub mod memory;
pub mod redb_store;
pub mod repository;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use redb_store::RedbStore;
pub use repository::{Collection, LoadOutcome, Record, RepoError, RepoResult, SnapshotHealth};

use shared::error::{AppError, ErrorCode};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Storage error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Snapshot '{key}' is not valid UTF-8: {source}")]
    Encoding {
        key: String,
        source: std::string::FromUtf8Error,
    },

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
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::with_message(ErrorCode::StorageError, err.to_string())
    }
}

/// Synchronous key-value store holding JSON snapshots
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
    /// All keys currently present, sorted
    fn keys(&self) -> StoreResult<Vec<String>>;
    fn backend(&self) -> StorageBackend;
}

/// Which backend to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    Memory,
    #[default]
    File,
    Redb,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Redb => "redb",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "file" | "json" => Ok(Self::File),
            "redb" => Ok(Self::Redb),
            other => Err(format!("unknown storage backend: {other}")),
        }
    }
}

/// Keys become file names, so keep them to a safe alphabet.
pub(crate) fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Open the configured backend rooted at `data_dir`
pub fn open_store(backend: StorageBackend, data_dir: &Path) -> StoreResult<Arc<dyn KvStore>> {
    let store: Arc<dyn KvStore> = match backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::File => Arc::new(FileStore::open(data_dir)?),
        StorageBackend::Redb => {
            std::fs::create_dir_all(data_dir)?;
            Arc::new(RedbStore::open(data_dir.join(redb_store::DB_FILE_NAME))?)
        }
    };
    tracing::info!(backend = %backend, path = %data_dir.display(), "Storage opened");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parse() {
        assert_eq!("redb".parse::<StorageBackend>(), Ok(StorageBackend::Redb));
        assert_eq!("JSON".parse::<StorageBackend>(), Ok(StorageBackend::File));
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("tasks").is_ok());
        assert!(validate_key("session.current").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key(".hidden").is_err());
    }

    #[test]
    fn test_open_store_memory_ignores_dir() {
        let store = open_store(StorageBackend::Memory, Path::new("/nonexistent")).unwrap();
        assert_eq!(store.backend(), StorageBackend::Memory);
    }
}
