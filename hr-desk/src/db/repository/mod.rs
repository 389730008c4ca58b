//! Repository Module
//!
//! Generic snapshot-persisted collection, one per record type.

mod collection;

pub use collection::{Collection, LoadOutcome, SnapshotHealth, load_snapshot};

use super::StoreError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// A record type persisted as one JSON array under a fixed key
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Storage key holding the collection snapshot
    const STORAGE_KEY: &'static str;
    /// Human-readable resource name for messages ("Task", "Vendor")
    const RESOURCE: &'static str;

    fn id(&self) -> i64;

    /// Identity the record belongs to, for owner-scoped access
    fn subject_id(&self) -> Option<i64> {
        None
    }
}

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: i64 },

    #[error("{resource} {id} already exists")]
    Duplicate { resource: &'static str, id: i64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { resource, id } => {
                AppError::not_found(resource).with_detail("id", id)
            }
            RepoError::Duplicate { resource, id } => {
                AppError::already_exists(resource).with_detail("id", id)
            }
            RepoError::Serialization(e) => {
                AppError::with_message(ErrorCode::StorageError, e.to_string())
            }
            RepoError::Store(e) => e.into(),
        }
    }
}
