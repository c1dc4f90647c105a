//! Core domain logic for the to-do app.
//! This crate is the single source of truth for task list invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod repo;
pub mod service;
pub mod storage;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{FilterCounts, ParseFilterError, Task, TaskFilter, TaskId, TaskValidationError};
pub use navigation::{Navigator, Screen};
pub use repo::task_repo::{PersistError, TaskListRepository, SCHEMA_VERSION, STORAGE_KEY};
pub use service::confirm::{
    Confirm, ConfirmRequest, ModalConfirmer, ModalPrompt, ParsePlatformError, Platform,
    PlatformConfirmer, PromptConfirmer,
};
pub use service::task_list::{ClearOutcome, ControllerState, TaskListController};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
