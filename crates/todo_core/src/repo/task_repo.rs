//! Task list persistence adapter.
//!
//! # Responsibility
//! - Load and save the complete task list under a single storage key.
//! - Enforce the payload schema version (fail-closed on unknown versions).
//! - Read bare task arrays as version 1, so lists saved before the versioned
//!   envelope survive the next save.
//!
//! # Invariants
//! - Loaded lists keep persisted order and contain unique ids.
//! - Every loaded task passes `Task::validate()`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::task::{Task, TaskValidationError};
use crate::storage::{KeyValueStore, StoreError};

/// Storage key holding the serialized task list.
pub const STORAGE_KEY: &str = "@todos_v1";

/// Payload schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

pub type PersistResult<T> = Result<T, PersistError>;

/// Errors raised while loading or saving the task list.
#[derive(Debug, Clone, Error)]
pub enum PersistError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("malformed task list payload: {0}")]
    Malformed(String),

    #[error(
        "task list schema version {found} is not supported (expected {expected})",
        expected = SCHEMA_VERSION
    )]
    UnsupportedSchemaVersion { found: u32 },

    #[error("invalid persisted task: {0}")]
    InvalidData(#[from] TaskValidationError),

    #[error("duplicate task id `{0}` in persisted list")]
    DuplicateId(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PayloadOut<'a> {
    schema_version: u32,
    tasks: &'a [Task],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayloadHeader {
    schema_version: u32,
}

#[derive(Debug, Deserialize)]
struct PayloadV1 {
    tasks: Vec<Task>,
}

/// Reads and writes the task list through a key-value store.
#[derive(Debug, Clone)]
pub struct TaskListRepository<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> TaskListRepository<S> {
    /// Creates a repository using the default storage key.
    pub fn new(store: S) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    /// Creates a repository writing under a custom key.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the persisted list.
    ///
    /// Returns `Ok(None)` when nothing has been saved yet.
    ///
    /// # Errors
    /// - `Store` when the backend read fails.
    /// - `Malformed` when the payload is not a valid task list document.
    /// - `UnsupportedSchemaVersion` when the payload was written by another schema.
    /// - `InvalidData` / `DuplicateId` when records break list invariants.
    pub async fn load(&self) -> PersistResult<Option<Vec<Task>>> {
        let Some(raw) = self.store.get(&self.key).await? else {
            return Ok(None);
        };
        decode_task_list(&raw).map(Some)
    }

    /// Replaces the persisted list with `tasks`.
    ///
    /// # Errors
    /// - `Malformed` when serialization fails.
    /// - `Store` when the backend write fails.
    pub async fn save(&self, tasks: &[Task]) -> PersistResult<()> {
        let raw = encode_task_list(tasks)?;
        self.store.set(&self.key, &raw).await?;
        Ok(())
    }
}

/// Serializes a task list into the versioned JSON payload.
pub fn encode_task_list(tasks: &[Task]) -> PersistResult<String> {
    serde_json::to_string(&PayloadOut {
        schema_version: SCHEMA_VERSION,
        tasks,
    })
    .map_err(|err| PersistError::Malformed(err.to_string()))
}

/// Parses and validates a task list payload.
///
/// Accepts the versioned envelope and the bare array of version 1 records.
pub fn decode_task_list(raw: &str) -> PersistResult<Vec<Task>> {
    let malformed = |err: serde_json::Error| PersistError::Malformed(err.to_string());
    let value: serde_json::Value = serde_json::from_str(raw).map_err(malformed)?;

    let tasks = if value.is_array() {
        Vec::<Task>::deserialize(value).map_err(malformed)?
    } else {
        let header = PayloadHeader::deserialize(&value).map_err(malformed)?;
        if header.schema_version != SCHEMA_VERSION {
            return Err(PersistError::UnsupportedSchemaVersion {
                found: header.schema_version,
            });
        }
        PayloadV1::deserialize(value).map_err(malformed)?.tasks
    };

    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        task.validate()?;
        if !seen.insert(task.id.as_str()) {
            return Err(PersistError::DuplicateId(task.id.to_string()));
        }
    }

    Ok(tasks)
}
