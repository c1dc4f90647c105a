//! Background writer for task list snapshots.
//!
//! # Responsibility
//! - Accept list snapshots without making the caller wait for storage.
//! - Write snapshots in submission order; log and drop failed writes.
//!
//! # Invariants
//! - A backlog of snapshots collapses to the newest one (last write wins).
//! - A flush resolves only after every snapshot submitted before it has
//!   been written or has failed.

use log::{debug, warn};
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};

use crate::model::task::Task;
use crate::repo::task_repo::TaskListRepository;
use crate::storage::KeyValueStore;

enum Command {
    Save(Vec<Task>),
    Flush(oneshot::Sender<()>),
}

/// Handle to the writer task. Dropping it lets the writer finish its
/// backlog and exit.
#[derive(Debug)]
pub struct Persister {
    commands: mpsc::UnboundedSender<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Save(tasks) => write!(f, "Save({} tasks)", tasks.len()),
            Self::Flush(_) => f.write_str("Flush"),
        }
    }
}

impl Persister {
    /// Spawns the writer task on the current Tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn spawn<S>(repo: TaskListRepository<S>) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let (commands, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(repo, receiver));
        Self { commands }
    }

    /// Schedules `tasks` to be written. Never waits for the write.
    pub fn schedule(&self, tasks: Vec<Task>) {
        if self.commands.send(Command::Save(tasks)).is_err() {
            warn!("event=task_save module=service status=error error_code=writer_stopped");
        }
    }

    /// Waits until every snapshot scheduled so far has been handled.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.commands.send(Command::Flush(done)).is_err() {
            return;
        }
        let _ = wait.await;
    }
}

async fn run_writer<S: KeyValueStore>(
    repo: TaskListRepository<S>,
    mut receiver: mpsc::UnboundedReceiver<Command>,
) {
    while let Some(command) = receiver.recv().await {
        match command {
            Command::Flush(done) => {
                let _ = done.send(());
            }
            Command::Save(mut snapshot) => {
                let mut pending_flushes = Vec::new();
                let mut coalesced = 0usize;
                // Drain the backlog; only the newest snapshot needs writing.
                while let Ok(next) = receiver.try_recv() {
                    match next {
                        Command::Save(newer) => {
                            snapshot = newer;
                            coalesced += 1;
                        }
                        Command::Flush(done) => pending_flushes.push(done),
                    }
                }

                write_snapshot(&repo, &snapshot, coalesced).await;
                for done in pending_flushes {
                    let _ = done.send(());
                }
            }
        }
    }
    debug!("event=writer_stop module=service status=ok");
}

async fn write_snapshot<S: KeyValueStore>(
    repo: &TaskListRepository<S>,
    snapshot: &[Task],
    coalesced: usize,
) {
    let started_at = Instant::now();
    match repo.save(snapshot).await {
        Ok(()) => debug!(
            "event=task_save module=service status=ok count={} coalesced={} duration_ms={}",
            snapshot.len(),
            coalesced,
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event=task_save module=service status=error count={} duration_ms={} error={}",
            snapshot.len(),
            started_at.elapsed().as_millis(),
            err
        ),
    }
}
