//! Generic record repository
//!
//! Keeps records of one model in memory, ordered by primary key, and
//! optionally mirrors them to a JSON file after every mutation.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::AdminError;
use crate::models::{Model, RecordId};

use super::file_io::{read_json, write_json_atomic};
use super::Store;

/// Serializable repository contents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "R: Model"))]
struct RepositoryData<R> {
    next_id: RecordId,
    records: Vec<R>,
}

impl<R> Default for RepositoryData<R> {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: Vec::new(),
        }
    }
}

struct State<R> {
    next_id: RecordId,
    records: BTreeMap<RecordId, R>,
}

/// Repository for records of one model
pub struct Repository<R: Model> {
    path: Option<PathBuf>,
    state: RwLock<State<R>>,
}

impl<R: Model> Repository<R> {
    /// Create a repository that lives only in memory
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(State {
                next_id: 1,
                records: BTreeMap::new(),
            }),
        }
    }

    /// Open a file-backed repository, loading existing records
    pub fn open(path: PathBuf) -> Result<Self, AdminError> {
        let repo = Self {
            path: Some(path),
            ..Self::in_memory()
        };
        repo.load()?;
        Ok(repo)
    }

    /// Reload records from disk; a no-op for in-memory repositories
    pub fn load(&self) -> Result<(), AdminError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file_data: RepositoryData<R> = read_json(path)?;

        let mut state = self.state.write().map_err(|e| {
            AdminError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        state.records = file_data
            .records
            .into_iter()
            .map(|record| (record.pk(), record))
            .collect();
        let max_pk = state.records.keys().next_back().copied().unwrap_or(0);
        state.next_id = file_data.next_id.max(max_pk + 1);

        Ok(())
    }

    fn save(&self, state: &State<R>) -> Result<(), AdminError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file_data = RepositoryData {
            next_id: state.next_id,
            records: state.records.values().cloned().collect(),
        };
        write_json_atomic(path, &file_data)
    }
}

impl<R: Model> Store<R> for Repository<R> {
    fn get(&self, pk: RecordId) -> Result<Option<R>, AdminError> {
        let state = self.state.read().map_err(|e| {
            AdminError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(state.records.get(&pk).cloned())
    }

    fn all(&self) -> Result<Vec<R>, AdminError> {
        let state = self.state.read().map_err(|e| {
            AdminError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(state.records.values().cloned().collect())
    }

    fn insert(&self, mut record: R) -> Result<R, AdminError> {
        let mut state = self.state.write().map_err(|e| {
            AdminError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let pk = state.next_id;
        state.next_id += 1;
        record.set_pk(pk);
        state.records.insert(pk, record.clone());
        self.save(&state)?;

        Ok(record)
    }

    fn update(&self, record: R) -> Result<R, AdminError> {
        let mut state = self.state.write().map_err(|e| {
            AdminError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let pk = record.pk();
        if !state.records.contains_key(&pk) {
            return Err(AdminError::record_not_found(R::meta().model_name, pk.to_string()));
        }
        state.records.insert(pk, record.clone());
        self.save(&state)?;

        Ok(record)
    }

    fn delete(&self, pk: RecordId) -> Result<bool, AdminError> {
        let mut state = self.state.write().map_err(|e| {
            AdminError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let removed = state.records.remove(&pk).is_some();
        if removed {
            self.save(&state)?;
        }
        Ok(removed)
    }

    fn count(&self) -> Result<usize, AdminError> {
        let state = self.state.read().map_err(|e| {
            AdminError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(state.records.len())
    }
}
