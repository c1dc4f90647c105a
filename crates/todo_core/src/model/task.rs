//! Task domain model.
//!
//! # Responsibility
//! - Define the single to-do record persisted and rendered by the app.
//! - Define the transient list filter and its per-tab counts.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `title` is trimmed and non-empty.
//! - `created_at` is captured once at creation and never changes.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Opaque stable task identifier.
///
/// Freshly generated ids are UUID v7 text, so ids created later sort after
/// ids created earlier. Ids read back from storage may be any non-empty text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh time-ordered id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Validation failures for task records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskValidationError {
    #[error("task id must not be empty")]
    EmptyId,
    #[error("task `{0}` has an empty title")]
    EmptyTitle(TaskId),
}

/// Single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub done: bool,
    /// Serialized as an ISO-8601 string.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates an open task from user input.
    ///
    /// Returns `None` when `title` is blank after trimming.
    pub fn new(title: &str) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        Some(Self {
            id: TaskId::generate(),
            title: title.to_string(),
            done: false,
            created_at: Utc::now(),
        })
    }

    /// Flips the completion flag.
    pub fn toggle(&mut self) {
        self.done = !self.done;
    }

    /// Checks record-level invariants.
    ///
    /// # Errors
    /// - `EmptyId` when the id is blank.
    /// - `EmptyTitle` when the title is blank.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle(self.id.clone()));
        }
        Ok(())
    }

    /// Renders the creation time in the local time zone for list rows.
    pub fn created_at_display(&self) -> String {
        self.created_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

/// View predicate for the task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Done,
}

impl TaskFilter {
    pub const ALL: [TaskFilter; 3] = [TaskFilter::All, TaskFilter::Active, TaskFilter::Done];

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.done,
            Self::Done => task.done,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Done => "done",
        }
    }

    /// Tab label without the count suffix.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Done => "Done",
        }
    }
}

impl Display for TaskFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown task filter `{0}`; expected all|active|done")]
pub struct ParseFilterError(pub String);

impl FromStr for TaskFilter {
    type Err = ParseFilterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "done" => Ok(Self::Done),
            other => Err(ParseFilterError(other.to_string())),
        }
    }
}

/// Number of tasks matched by each filter tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCounts {
    pub all: usize,
    pub active: usize,
    pub done: usize,
}

impl FilterCounts {
    pub fn of(tasks: &[Task]) -> Self {
        let done = tasks.iter().filter(|task| task.done).count();
        Self {
            all: tasks.len(),
            active: tasks.len() - done,
            done,
        }
    }

    pub fn get(&self, filter: TaskFilter) -> usize {
        match filter {
            TaskFilter::All => self.all,
            TaskFilter::Active => self.active,
            TaskFilter::Done => self.done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FilterCounts, Task, TaskFilter, TaskId, TaskValidationError};

    #[test]
    fn new_task_trims_title_and_starts_open() {
        let task = Task::new("  Buy milk ").expect("non-blank title");
        assert_eq!(task.title, "Buy milk");
        assert!(!task.done);
    }

    #[test]
    fn new_task_rejects_blank_titles() {
        assert!(Task::new("").is_none());
        assert!(Task::new(" \t\n").is_none());
    }

    #[test]
    fn validate_rejects_empty_title() {
        let mut task = Task::new("x").expect("non-blank title");
        task.title = "  ".to_string();
        assert_eq!(
            task.validate(),
            Err(TaskValidationError::EmptyTitle(task.id.clone()))
        );
    }

    #[test]
    fn filter_parses_case_insensitively() {
        assert_eq!(" Done ".parse::<TaskFilter>(), Ok(TaskFilter::Done));
        assert!("finished".parse::<TaskFilter>().is_err());
    }

    #[test]
    fn counts_split_active_and_done() {
        let mut first = Task::new("a").expect("title");
        let second = Task::new("b").expect("title");
        first.toggle();
        let counts = FilterCounts::of(&[first, second]);
        assert_eq!(
            counts,
            FilterCounts {
                all: 2,
                active: 1,
                done: 1
            }
        );
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(TaskId::generate(), TaskId::generate());
    }
}
