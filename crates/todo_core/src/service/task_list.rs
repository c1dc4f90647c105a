//! Task list controller.
//!
//! # Responsibility
//! - Own the authoritative in-memory task list and the active filter.
//! - Apply user mutations and hand every change to the background persister.
//! - Hydrate the list from storage once at startup.
//!
//! # Invariants
//! - Task ids are unique within the list at all times.
//! - New tasks are prepended (newest first).
//! - Nothing is persisted before `initialize()` has finished; mutations made
//!   earlier are journaled and replayed on top of the loaded list, including
//!   toggles and deletes aimed at tasks that were not loaded yet.
//! - A confirmed clear only removes the tasks that were done when the user
//!   confirmed it.
//! - No operation returns an error; storage failures end here as log lines.

use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

use crate::model::task::{FilterCounts, Task, TaskFilter, TaskId};
use crate::repo::task_repo::TaskListRepository;
use crate::service::confirm::{Confirm, ConfirmRequest};
use crate::service::persister::Persister;
use crate::storage::KeyValueStore;

/// Lifecycle of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// `initialize()` has not finished yet.
    Uninitialized,
    /// Persisted state has been loaded (or given up on).
    Ready,
}

/// Result of a bulk-clear request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// No task was done; the user was not asked.
    NothingToClear,
    /// The user declined the confirmation.
    Cancelled,
    /// The given number of done tasks was removed.
    Cleared(usize),
}

#[derive(Debug, Clone)]
enum Mutation {
    Add(Task),
    Toggle(TaskId),
    Delete(TaskId),
    ClearCompleted(Vec<TaskId>),
}

impl Mutation {
    fn name(&self) -> &'static str {
        match self {
            Self::Add(_) => "task_add",
            Self::Toggle(_) => "task_toggle",
            Self::Delete(_) => "task_delete",
            Self::ClearCompleted(_) => "task_clear_completed",
        }
    }

    /// Applies the mutation and reports whether the list changed.
    fn apply(&self, tasks: &mut Vec<Task>) -> bool {
        match self {
            Self::Add(task) => {
                if tasks.iter().any(|existing| existing.id == task.id) {
                    return false;
                }
                tasks.insert(0, task.clone());
                true
            }
            Self::Toggle(id) => match tasks.iter_mut().find(|task| &task.id == id) {
                Some(task) => {
                    task.toggle();
                    true
                }
                None => false,
            },
            Self::Delete(id) => {
                let before = tasks.len();
                tasks.retain(|task| &task.id != id);
                tasks.len() != before
            }
            Self::ClearCompleted(ids) => {
                let before = tasks.len();
                tasks.retain(|task| !ids.contains(&task.id));
                tasks.len() != before
            }
        }
    }
}

/// State holder behind the to-do screen.
///
/// UI layers read through the accessors and re-render when the revision
/// returned by [`TaskListController::subscribe`] changes.
pub struct TaskListController<S: KeyValueStore + 'static> {
    tasks: Vec<Task>,
    filter: TaskFilter,
    state: ControllerState,
    journal: Vec<Mutation>,
    repo: TaskListRepository<Arc<S>>,
    persister: Persister,
    confirmer: Box<dyn Confirm>,
    revision: watch::Sender<u64>,
}

impl<S: KeyValueStore + 'static> TaskListController<S> {
    /// Creates an uninitialized controller with an empty list.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime (the persister task is
    /// spawned here).
    pub fn new(store: S, confirmer: impl Confirm + 'static) -> Self {
        Self::with_repository(TaskListRepository::new(Arc::new(store)), confirmer)
    }

    /// Creates a controller over an explicitly configured repository.
    pub fn with_repository(
        repo: TaskListRepository<Arc<S>>,
        confirmer: impl Confirm + 'static,
    ) -> Self {
        let writer_repo = TaskListRepository::with_key(Arc::clone(repo.store()), repo.key());
        let (revision, _) = watch::channel(0);
        Self {
            tasks: Vec::new(),
            filter: TaskFilter::default(),
            state: ControllerState::Uninitialized,
            journal: Vec::new(),
            repo,
            persister: Persister::spawn(writer_repo),
            confirmer: Box::new(confirmer),
            revision,
        }
    }

    /// Loads persisted tasks once.
    ///
    /// Load failures (unavailable storage, malformed payload, unknown schema
    /// version) are logged and leave the list empty. Mutations made before
    /// this call are replayed on top of the loaded list and persisted.
    pub async fn initialize(&mut self) {
        if self.state == ControllerState::Ready {
            debug!("event=task_list_init module=service status=skipped reason=already_ready");
            return;
        }

        let started_at = Instant::now();
        let mut tasks = match self.repo.load().await {
            Ok(Some(tasks)) => {
                info!(
                    "event=task_list_init module=service status=ok source=storage count={} duration_ms={}",
                    tasks.len(),
                    started_at.elapsed().as_millis()
                );
                tasks
            }
            Ok(None) => {
                info!(
                    "event=task_list_init module=service status=ok source=empty duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Vec::new()
            }
            Err(err) => {
                warn!(
                    "event=task_list_init module=service status=error source=fallback_empty duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Vec::new()
            }
        };

        let journal = std::mem::take(&mut self.journal);
        let replay_changed = journal
            .iter()
            .fold(false, |changed, mutation| mutation.apply(&mut tasks) || changed);
        if !journal.is_empty() {
            info!(
                "event=task_list_replay module=service status=ok replayed={} changed={}",
                journal.len(),
                replay_changed
            );
        }

        self.tasks = tasks;
        self.state = ControllerState::Ready;
        if replay_changed {
            self.persister.schedule(self.tasks.clone());
        }
        self.bump_revision();
    }

    /// Adds a task titled `title` at the front of the list.
    ///
    /// Returns `None` (and changes nothing) when the trimmed title is empty.
    pub fn add(&mut self, title: &str) -> Option<TaskId> {
        let task = Task::new(title)?;
        let id = task.id.clone();
        self.mutate(Mutation::Add(task));
        Some(id)
    }

    /// Flips `done` on the task with `id`. Unknown ids are ignored.
    ///
    /// Returns whether a task in the current list was toggled. Before
    /// `initialize()` the request is also kept for replay, since `id` may
    /// belong to a task that has not been loaded yet.
    pub fn toggle(&mut self, id: &TaskId) -> bool {
        self.mutate(Mutation::Toggle(id.clone()))
    }

    /// Removes the task with `id`. Unknown ids are ignored.
    ///
    /// Returns whether a task in the current list was removed. Before
    /// `initialize()` the request is also kept for replay.
    pub fn delete(&mut self, id: &TaskId) -> bool {
        self.mutate(Mutation::Delete(id.clone()))
    }

    /// Removes every done task after the user confirms.
    ///
    /// Does not prompt when no task is done. Only tasks that were done when
    /// the user confirmed are removed; before `initialize()` that excludes
    /// stored tasks the user has not seen.
    pub async fn clear_completed(&mut self) -> ClearOutcome {
        let done_ids = self
            .tasks
            .iter()
            .filter(|task| task.done)
            .map(|task| task.id.clone())
            .collect::<Vec<_>>();
        let done = done_ids.len();
        if done == 0 {
            debug!("event=task_clear_completed module=service status=skipped reason=nothing_done");
            return ClearOutcome::NothingToClear;
        }

        if !self
            .confirmer
            .confirm(&ConfirmRequest::clear_completed())
            .await
        {
            info!("event=task_clear_completed module=service status=cancelled pending={done}");
            return ClearOutcome::Cancelled;
        }

        let before = self.tasks.len();
        self.mutate(Mutation::ClearCompleted(done_ids));
        ClearOutcome::Cleared(before - self.tasks.len())
    }

    /// Tasks matching `filter`, in list order.
    pub fn filtered_view(&self, filter: TaskFilter) -> Vec<&Task> {
        self.tasks.iter().filter(|task| filter.matches(task)).collect()
    }

    /// Tasks matching the active filter.
    pub fn visible(&self) -> Vec<&Task> {
        self.filtered_view(self.filter)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    /// Changes the active filter. Filters are never persisted.
    pub fn set_filter(&mut self, filter: TaskFilter) {
        if self.filter != filter {
            self.filter = filter;
            self.bump_revision();
        }
    }

    pub fn counts(&self) -> FilterCounts {
        FilterCounts::of(&self.tasks)
    }

    pub fn has_completed(&self) -> bool {
        self.tasks.iter().any(|task| task.done)
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ControllerState::Ready
    }

    /// Revision counter that advances on every list or filter change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Waits until every scheduled save has been attempted.
    pub async fn flush(&self) {
        self.persister.flush().await;
    }

    fn mutate(&mut self, mutation: Mutation) -> bool {
        let changed = mutation.apply(&mut self.tasks);
        match self.state {
            ControllerState::Uninitialized => {
                // Stored tasks are not loaded yet; replay decides what this hits.
                debug!(
                    "event={} module=service status=journaled changed={} pending={}",
                    mutation.name(),
                    changed,
                    self.journal.len() + 1
                );
                self.journal.push(mutation);
            }
            ControllerState::Ready if changed => {
                debug!(
                    "event={} module=service status=ok count={}",
                    mutation.name(),
                    self.tasks.len()
                );
                self.persister.schedule(self.tasks.clone());
            }
            ControllerState::Ready => {
                debug!(
                    "event={} module=service status=skipped reason=no_change",
                    mutation.name()
                );
            }
        }
        if changed {
            self.bump_revision();
        }
        changed
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}
