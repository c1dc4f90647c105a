//! Asynchronous key-value store port and its adapters.
//!
//! # Responsibility
//! - Define the get/set-by-key contract the persistence adapter writes through.
//! - Keep storage engines swappable behind one trait object.
//!
//! # Invariants
//! - `set` replaces any previous value stored under the same key.
//! - Implementations are safe to share across tasks (`Send + Sync`).

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::db::DbError;

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by key-value store adapters.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backing store could not be reached or refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Underlying engine failure.
    #[error("storage backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps an engine error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::backend(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::backend(value)
    }
}

/// String key-value store with asynchronous access.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// Returns `None` when nothing has been stored yet.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing the previous value.
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value).await
    }
}
