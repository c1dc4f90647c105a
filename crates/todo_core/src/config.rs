//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve the database path, log level, log directory and platform used by
//!   hosts.
//!
//! # Invariants
//! - Blank environment values are treated as unset.

use crate::logging::default_log_level;
use crate::service::confirm::Platform;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "TODO_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "TODO_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "TODO_LOG_DIR";
pub const PLATFORM_ENV: &str = "TODO_PLATFORM";
pub const DEFAULT_DB_FILE_NAME: &str = "todo_core.sqlite3";

/// Host-level settings for opening storage and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Logging stays disabled when `None`.
    pub log_dir: Option<PathBuf>,
    /// Decides how confirmations are presented.
    pub platform: Platform,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            platform: Platform::current(),
        }
    }
}

impl CoreConfig {
    /// Reads `TODO_DB_PATH`, `TODO_LOG_LEVEL`, `TODO_LOG_DIR` and
    /// `TODO_PLATFORM`. Unknown platform names keep the compile target's.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(LOG_LEVEL_ENV) {
            config.log_level = level;
        }
        config.log_dir = read(LOG_DIR_ENV).map(PathBuf::from);
        if let Some(platform) = read(PLATFORM_ENV).and_then(|raw| raw.parse().ok()) {
            config.platform = platform;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CoreConfig, DB_PATH_ENV, DEFAULT_DB_FILE_NAME, LOG_DIR_ENV, LOG_LEVEL_ENV, PLATFORM_ENV,
    };
    use crate::service::confirm::Platform;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn missing_variables_fall_back_to_defaults() {
        let config = CoreConfig::from_lookup(|_| None);
        assert!(config.db_path.ends_with(DEFAULT_DB_FILE_NAME));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn variables_override_defaults_and_blank_values_are_ignored() {
        let vars = HashMap::from([
            (DB_PATH_ENV, "/data/todos.sqlite3"),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_DIR_ENV, "   "),
        ]);
        let config = CoreConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.db_path, PathBuf::from("/data/todos.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn platform_variable_overrides_compile_target() {
        let config = CoreConfig::from_lookup(|name| {
            (name == PLATFORM_ENV).then(|| "android".to_string())
        });
        assert_eq!(config.platform, Platform::Android);

        let config = CoreConfig::from_lookup(|name| {
            (name == PLATFORM_ENV).then(|| "toaster".to_string())
        });
        assert_eq!(config.platform, Platform::current());
    }
}
