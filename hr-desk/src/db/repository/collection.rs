//! Snapshot-persisted collection
//!
//! Every mutation writes the full collection back to its storage key
//! before the in-memory copy is swapped, so a failed write leaves both
//! sides at the previous state. Last writer wins; there is no version
//! check between processes sharing a store.

use super::{Record, RepoError, RepoResult};
use crate::db::{KvStore, StoreError, StoreResult};
use std::sync::Arc;

/// Result of reading a snapshot from the store
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome<T> {
    /// Key not present
    Absent,
    /// Parsed successfully
    Loaded(Vec<T>),
    /// Key present but the payload is not UTF-8 or does not parse as `Vec<T>`
    Corrupt { reason: String },
}

impl<T> LoadOutcome<T> {
    pub fn health(&self) -> SnapshotHealth {
        match self {
            Self::Absent => SnapshotHealth::Absent,
            Self::Loaded(_) => SnapshotHealth::Healthy,
            Self::Corrupt { .. } => SnapshotHealth::Corrupt,
        }
    }

    /// Records, empty for absent or corrupt snapshots
    pub fn into_records(self) -> Vec<T> {
        match self {
            Self::Loaded(records) => records,
            Self::Absent | Self::Corrupt { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotHealth {
    Absent,
    Healthy,
    Corrupt,
}

/// Read and parse the snapshot for `T`
///
/// Corruption is logged and reported, never raised: callers keep working on
/// an empty collection.
pub fn load_snapshot<T: Record>(store: &dyn KvStore) -> StoreResult<LoadOutcome<T>> {
    let raw = match store.get(T::STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Ok(LoadOutcome::Absent),
        Err(e @ StoreError::Encoding { .. }) => {
            tracing::warn!(
                key = T::STORAGE_KEY,
                error = %e,
                "Unreadable snapshot, continuing with empty collection"
            );
            return Ok(LoadOutcome::Corrupt {
                reason: e.to_string(),
            });
        }
        Err(e) => return Err(e),
    };
    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(records) => Ok(LoadOutcome::Loaded(records)),
        Err(e) => {
            tracing::warn!(
                key = T::STORAGE_KEY,
                error = %e,
                "Corrupt snapshot, continuing with empty collection"
            );
            Ok(LoadOutcome::Corrupt {
                reason: e.to_string(),
            })
        }
    }
}

pub struct Collection<T: Record> {
    store: Arc<dyn KvStore>,
    records: Vec<T>,
    health: SnapshotHealth,
    corrupt_reason: Option<String>,
}

impl<T: Record> Collection<T> {
    /// Open and load the collection
    pub fn open(store: Arc<dyn KvStore>) -> StoreResult<Self> {
        let mut collection = Self {
            store,
            records: Vec::new(),
            health: SnapshotHealth::Absent,
            corrupt_reason: None,
        };
        collection.reload()?;
        Ok(collection)
    }

    /// Re-read the snapshot, discarding the in-memory copy
    pub fn reload(&mut self) -> StoreResult<SnapshotHealth> {
        let outcome = load_snapshot::<T>(self.store.as_ref())?;
        self.health = outcome.health();
        self.corrupt_reason = match &outcome {
            LoadOutcome::Corrupt { reason } => Some(reason.clone()),
            _ => None,
        };
        self.records = outcome.into_records();
        Ok(self.health)
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<&T> {
        self.records.iter().find(|r| predicate(r))
    }

    pub fn health(&self) -> SnapshotHealth {
        self.health
    }

    pub fn corrupt_reason(&self) -> Option<&str> {
        self.corrupt_reason.as_deref()
    }

    /// Overwrite the stored snapshot with `records`
    pub fn save_all(&mut self, records: Vec<T>) -> RepoResult<()> {
        self.commit(records)
    }

    /// Append a new record; ids must be unique
    pub fn create(&mut self, record: T) -> RepoResult<T> {
        if self.get(record.id()).is_some() {
            return Err(RepoError::Duplicate {
                resource: T::RESOURCE,
                id: record.id(),
            });
        }
        let mut next = self.records.clone();
        next.push(record.clone());
        self.commit(next)?;
        Ok(record)
    }

    /// Full-record replace keyed by id
    pub fn replace(&mut self, record: T) -> RepoResult<T> {
        let id = record.id();
        let index = self.index_of(id)?;
        let mut next = self.records.clone();
        next[index] = record.clone();
        self.commit(next)?;
        Ok(record)
    }

    /// Apply `patch` to the record with `id` and persist
    pub fn update(&mut self, id: i64, patch: impl FnOnce(&mut T)) -> RepoResult<T> {
        let index = self.index_of(id)?;
        let mut updated = self.records[index].clone();
        patch(&mut updated);
        let mut next = self.records.clone();
        next[index] = updated.clone();
        self.commit(next)?;
        Ok(updated)
    }

    /// Remove by id; `false` when nothing matched
    pub fn remove(&mut self, id: i64) -> RepoResult<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let next: Vec<T> = self.records.iter().filter(|r| r.id() != id).cloned().collect();
        self.commit(next)?;
        Ok(true)
    }

    fn index_of(&self, id: i64) -> RepoResult<usize> {
        self.records
            .iter()
            .position(|r| r.id() == id)
            .ok_or(RepoError::NotFound {
                resource: T::RESOURCE,
                id,
            })
    }

    fn commit(&mut self, next: Vec<T>) -> RepoResult<()> {
        let json = serde_json::to_string(&next)?;
        self.store.set(T::STORAGE_KEY, &json)?;
        tracing::debug!(key = T::STORAGE_KEY, count = next.len(), "Snapshot saved");
        self.records = next;
        self.health = SnapshotHealth::Healthy;
        self.corrupt_reason = None;
        Ok(())
    }
}
