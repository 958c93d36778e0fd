//! Ordered, persisted log of past prediction runs.
//!
//! Individual runs are inserted at the front, bulk runs at the back. Every mutation rewrites
//! the whole document through the [`HistoryStorage`] port before the in-memory copy changes.

mod storage;

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{BulkPredictions, EmployeeProfile, PredictionResult};

pub use storage::{FileHistoryStorage, HistoryStorage, InMemoryHistoryStorage, StorageError};

/// One persisted record of a past individual or bulk prediction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryEntry {
    Individual {
        timestamp: DateTime<Utc>,
        profile: EmployeeProfile,
        results: PredictionResult,
    },
    Bulk {
        timestamp: DateTime<Utc>,
        #[serde(rename = "bulkResults")]
        bulk_results: BulkPredictions,
    },
}

impl HistoryEntry {
    pub fn individual(profile: EmployeeProfile, results: PredictionResult) -> Self {
        Self::Individual {
            timestamp: Utc::now(),
            profile,
            results,
        }
    }

    pub fn bulk(bulk_results: BulkPredictions) -> Self {
        Self::Bulk {
            timestamp: Utc::now(),
            bulk_results,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Individual { timestamp, .. } | Self::Bulk { timestamp, .. } => *timestamp,
        }
    }

    /// Where new entries of this kind are inserted.
    pub fn insert_position(&self) -> InsertPosition {
        match self {
            Self::Individual { .. } => InsertPosition::Front,
            Self::Bulk { .. } => InsertPosition::Back,
        }
    }

    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Individual { .. } => "individual",
            Self::Bulk { .. } => "bulk",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Front,
    Back,
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("history store lock poisoned")]
    Poisoned,
    #[error("history write task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Process-wide history, constructed once and shared by reference.
pub struct PredictionHistoryStore<S> {
    storage: S,
    entries: Mutex<Vec<HistoryEntry>>,
}

impl<S> PredictionHistoryStore<S>
where
    S: HistoryStorage,
{
    /// Reconstructs the store from persisted storage. Absent, unreadable, or malformed data
    /// yields an empty store.
    pub fn load(storage: S) -> Self {
        let entries = match storage.read() {
            Ok(Some(document)) => match serde_json::from_str::<Vec<HistoryEntry>>(&document) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(error = %err, "discarding malformed prediction history");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "prediction history unreadable; starting empty");
                Vec::new()
            }
        };
        debug!(entries = entries.len(), "prediction history loaded");

        Self {
            storage,
            entries: Mutex::new(entries),
        }
    }

    pub fn append(
        &self,
        entry: HistoryEntry,
        position: InsertPosition,
    ) -> Result<(), HistoryError> {
        let mut entries = self.lock()?;
        let mut updated = Vec::with_capacity(entries.len() + 1);
        match position {
            InsertPosition::Front => {
                updated.push(entry);
                updated.extend(entries.iter().cloned());
            }
            InsertPosition::Back => {
                updated.extend(entries.iter().cloned());
                updated.push(entry);
            }
        }
        self.persist(&updated)?;
        *entries = updated;
        debug!(entries = entries.len(), ?position, "prediction history appended");
        Ok(())
    }

    /// Appends at the position the entry kind dictates.
    pub fn record(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let position = entry.insert_position();
        self.append(entry, position)
    }

    /// Snapshot in stored order.
    pub fn all(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self.lock()?.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) -> Result<(), HistoryError> {
        let mut entries = self.lock()?;
        self.persist(&[])?;
        entries.clear();
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        let document = serde_json::to_string(entries)?;
        self.storage.write(&document)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<HistoryEntry>>, HistoryError> {
        self.entries.lock().map_err(|_| HistoryError::Poisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workforce::domain::{
        AttritionPrediction, PerformancePrediction, RetentionPrediction,
    };

    struct FailingStorage;

    impl HistoryStorage for FailingStorage {
        fn read(&self) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn write(&self, _document: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk full".to_string()))
        }
    }

    fn results(rating: u8) -> PredictionResult {
        PredictionResult {
            attrition: AttritionPrediction {
                risk: 0,
                probability: 0.1,
            },
            performance: PerformancePrediction { rating },
            retention: RetentionPrediction {
                risk: 0,
                probability: 0.2,
            },
        }
    }

    #[test]
    fn malformed_document_loads_empty() {
        let storage = InMemoryHistoryStorage::with_document("{not json");
        let store = PredictionHistoryStore::load(storage);
        assert!(store.is_empty());
    }

    #[test]
    fn failed_write_leaves_store_unchanged() {
        let store = PredictionHistoryStore::load(FailingStorage);
        let err = store
            .record(HistoryEntry::individual(EmployeeProfile::default(), results(3)))
            .expect_err("write fails");
        assert!(matches!(err, HistoryError::Storage(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn clear_persists_empty_document() {
        let store = PredictionHistoryStore::load(InMemoryHistoryStorage::new());
        store
            .record(HistoryEntry::individual(EmployeeProfile::default(), results(4)))
            .expect("append succeeds");
        store.clear().expect("clear succeeds");
        assert!(store.is_empty());
        assert_eq!(
            store.storage().read().expect("read").as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn bulk_entries_use_camel_case_results_key() {
        let entry = HistoryEntry::bulk(BulkPredictions::default());
        let value = serde_json::to_value(&entry).expect("serializes");
        assert_eq!(value["kind"], "bulk");
        assert!(value.get("bulkResults").is_some());
    }
}
