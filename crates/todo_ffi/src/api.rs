//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the to-do screen operations to Dart via FRB.
//! - Own the process-wide controller and the Tokio runtime driving it.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - The controller is initialized before any exported operation runs.
//! - Clear-completed never asks twice: Dart shows the platform dialog and
//!   passes the answer in. The core confirmer selected for the platform
//!   (modal host or native prompt) replays that answer.

use log::{info, warn};
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use todo_core::navigation::{ABOUT_BODY, ABOUT_TECH_STACK, ABOUT_TITLE};
use todo_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    ClearOutcome, CoreConfig, ModalPrompt, PlatformConfirmer, SqliteStore, Task, TaskFilter,
    TaskId, TaskListController,
};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

static TODO_HOST: OnceCell<TodoHost> = OnceCell::new();

struct TodoHost {
    runtime: Runtime,
    controller: Mutex<TaskListController<SqliteStore>>,
    /// Answer Dart collected from its confirmation dialog.
    ui_answer: Arc<AtomicBool>,
    db_path: PathBuf,
}

impl TodoHost {
    fn start(config: CoreConfig) -> Result<Self, String> {
        let CoreConfig {
            db_path, platform, ..
        } = config;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|err| format!("runtime start failed: {err}"))?;
        let store =
            SqliteStore::open(&db_path).map_err(|err| format!("todo DB open failed: {err}"))?;

        let ui_answer = Arc::new(AtomicBool::new(false));
        let answer = Arc::clone(&ui_answer);
        let (confirmer, prompts) =
            PlatformConfirmer::select(platform, move |_: &str| answer.load(Ordering::SeqCst));

        let controller = {
            let _guard = runtime.enter();
            if let Some(prompts) = prompts {
                tokio::spawn(answer_modal_prompts(prompts, Arc::clone(&ui_answer)));
            }
            TaskListController::new(store, confirmer)
        };
        let controller = Mutex::new(controller);
        {
            let mut guard = controller
                .lock()
                .map_err(|_| "controller lock poisoned".to_string())?;
            runtime.block_on(guard.initialize());
        }

        info!(
            "event=ffi_host_start module=ffi status=ok db_path={} platform={}",
            db_path.display(),
            platform
        );
        Ok(Self {
            runtime,
            controller,
            ui_answer,
            db_path,
        })
    }
}

/// Resolves modal confirmations with the answer Dart already collected.
async fn answer_modal_prompts(
    mut prompts: mpsc::UnboundedReceiver<ModalPrompt>,
    ui_answer: Arc<AtomicBool>,
) {
    while let Some(prompt) = prompts.recv().await {
        prompt.answer(ui_answer.load(Ordering::SeqCst));
    }
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One row of the to-do list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: String,
    pub title: String,
    pub done: bool,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    /// Local-time rendering for the row subtitle.
    pub created_at_display: String,
}

/// Task totals shown on the filter tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoCounts {
    pub all: u32,
    pub active: u32,
    pub done: u32,
}

/// Filtered list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListResponse {
    pub ok: bool,
    pub items: Vec<TodoItem>,
    /// Applied filter (`all|active|done`).
    pub filter: String,
    pub counts: TodoCounts,
    pub message: String,
}

/// Generic action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoActionResponse {
    pub ok: bool,
    /// Task affected by the action, when there is one.
    pub task_id: Option<String>,
    pub message: String,
}

impl TodoActionResponse {
    fn success(message: impl Into<String>, task_id: Option<String>) -> Self {
        Self {
            ok: true,
            task_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            message: message.into(),
        }
    }
}

/// Static About screen content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AboutInfo {
    pub title: String,
    pub body: String,
    pub tech_stack: Vec<String>,
}

/// Opens storage and loads the persisted list.
///
/// `db_path = None` resolves the path from `TODO_DB_PATH` or the temp dir.
///
/// # FFI contract
/// - Idempotent; later calls report the path already in use.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_init(db_path: Option<String>) -> TodoActionResponse {
    let requested = db_path
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from);
    match host_with(requested) {
        Ok(host) => TodoActionResponse::success(
            format!("Storage ready at {}.", host.db_path.display()),
            None,
        ),
        Err(err) => TodoActionResponse::failure(format!("todo_init failed: {err}")),
    }
}

/// Lists tasks matching `filter` (`all|active|done`, default `all`).
#[flutter_rust_bridge::frb(sync)]
pub fn todo_list(filter: Option<String>) -> TodoListResponse {
    let filter = match filter.as_deref().map(str::parse::<TaskFilter>) {
        None => TaskFilter::All,
        Some(Ok(filter)) => filter,
        Some(Err(err)) => return list_failure(TaskFilter::All, err.to_string()),
    };

    let result = with_controller(|_, controller| {
        controller.set_filter(filter);
        let items = controller
            .visible()
            .into_iter()
            .map(to_todo_item)
            .collect::<Vec<_>>();
        (items, to_counts(controller))
    });

    match result {
        Ok((items, counts)) => {
            let message = if items.is_empty() {
                "No tasks yet".to_string()
            } else {
                format!("{} task(s).", items.len())
            };
            TodoListResponse {
                ok: true,
                items,
                filter: filter.to_string(),
                counts,
                message,
            }
        }
        Err(err) => list_failure(filter, format!("todo_list failed: {err}")),
    }
}

/// Returns per-filter totals.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_counts() -> TodoCounts {
    with_controller(|_, controller| to_counts(controller)).unwrap_or(TodoCounts {
        all: 0,
        active: 0,
        done: 0,
    })
}

/// Adds a task. Blank titles are ignored and reported as not created.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_add(title: String) -> TodoActionResponse {
    match with_controller(|_, controller| controller.add(&title)) {
        Ok(Some(id)) => TodoActionResponse::success("Task added.", Some(id.to_string())),
        Ok(None) => TodoActionResponse::success("Nothing to add.", None),
        Err(err) => TodoActionResponse::failure(format!("todo_add failed: {err}")),
    }
}

/// Flips a task between active and done. Unknown ids are a silent no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_toggle(id: String) -> TodoActionResponse {
    let id = TaskId::from(id);
    match with_controller(|_, controller| controller.toggle(&id)) {
        Ok(true) => TodoActionResponse::success("Task toggled.", Some(id.to_string())),
        Ok(false) => TodoActionResponse::success("No such task.", None),
        Err(err) => TodoActionResponse::failure(format!("todo_toggle failed: {err}")),
    }
}

/// Deletes a task. Unknown ids are a silent no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_delete(id: String) -> TodoActionResponse {
    let id = TaskId::from(id);
    match with_controller(|_, controller| controller.delete(&id)) {
        Ok(true) => TodoActionResponse::success("Task deleted.", Some(id.to_string())),
        Ok(false) => TodoActionResponse::success("No such task.", None),
        Err(err) => TodoActionResponse::failure(format!("todo_delete failed: {err}")),
    }
}

/// Whether Dart should offer the clear-completed dialog at all.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_has_completed() -> bool {
    with_controller(|_, controller| controller.has_completed()).unwrap_or(false)
}

/// Removes done tasks when `confirmed` is true.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_clear_completed(confirmed: bool) -> TodoActionResponse {
    let result = with_host(|host, controller| {
        host.ui_answer.store(confirmed, Ordering::SeqCst);
        host.runtime.block_on(controller.clear_completed())
    });
    match result {
        Ok(ClearOutcome::Cleared(count)) => {
            TodoActionResponse::success(format!("Cleared {count} task(s)."), None)
        }
        Ok(ClearOutcome::Cancelled) => TodoActionResponse::success("Clear cancelled.", None),
        Ok(ClearOutcome::NothingToClear) => {
            TodoActionResponse::success("Nothing to clear.", None)
        }
        Err(err) => TodoActionResponse::failure(format!("todo_clear_completed failed: {err}")),
    }
}

/// Blocks until every scheduled save has been attempted.
///
/// Dart calls this when the app moves to the background.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_flush() -> TodoActionResponse {
    match with_host(|host, controller| host.runtime.block_on(controller.flush())) {
        Ok(()) => TodoActionResponse::success("Flushed.", None),
        Err(err) => TodoActionResponse::failure(format!("todo_flush failed: {err}")),
    }
}

/// Static About screen content.
#[flutter_rust_bridge::frb(sync)]
pub fn about_info() -> AboutInfo {
    AboutInfo {
        title: ABOUT_TITLE.to_string(),
        body: ABOUT_BODY.to_string(),
        tech_stack: ABOUT_TECH_STACK.iter().map(|line| line.to_string()).collect(),
    }
}

fn host_with(db_path: Option<PathBuf>) -> Result<&'static TodoHost, String> {
    TODO_HOST.get_or_try_init(|| {
        let mut config = CoreConfig::from_env();
        if let Some(path) = db_path {
            config.db_path = path;
        }
        TodoHost::start(config)
    })
}

fn with_host<T>(
    f: impl FnOnce(&TodoHost, &mut TaskListController<SqliteStore>) -> T,
) -> Result<T, String> {
    let host = host_with(None)?;
    let mut controller = host.controller.lock().map_err(|_| {
        warn!("event=ffi_call module=ffi status=error error_code=lock_poisoned");
        "controller lock poisoned".to_string()
    })?;
    Ok(f(host, &mut controller))
}

fn with_controller<T>(
    f: impl FnOnce(&TodoHost, &mut TaskListController<SqliteStore>) -> T,
) -> Result<T, String> {
    with_host(|host, controller| {
        let _guard = host.runtime.enter();
        f(host, controller)
    })
}

fn list_failure(filter: TaskFilter, message: String) -> TodoListResponse {
    TodoListResponse {
        ok: false,
        items: Vec::new(),
        filter: filter.to_string(),
        counts: TodoCounts {
            all: 0,
            active: 0,
            done: 0,
        },
        message,
    }
}

fn to_todo_item(task: &Task) -> TodoItem {
    TodoItem {
        id: task.id.to_string(),
        title: task.title.clone(),
        done: task.done,
        created_at: task.created_at.to_rfc3339(),
        created_at_display: task.created_at_display(),
    }
}

fn to_counts(controller: &TaskListController<SqliteStore>) -> TodoCounts {
    let counts = controller.counts();
    let clamp = |value: usize| u32::try_from(value).unwrap_or(u32::MAX);
    TodoCounts {
        all: clamp(counts.all),
        active: clamp(counts.active),
        done: clamp(counts.done),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        about_info, answer_modal_prompts, core_version, init_logging, ping, todo_add,
        todo_clear_completed, todo_counts, todo_delete, todo_flush, todo_has_completed,
        todo_init, todo_list, todo_toggle,
    };
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, OnceLock};
    use std::time::{SystemTime, UNIX_EPOCH};
    use todo_core::{Confirm, ConfirmRequest, Platform, PlatformConfirmer};

    static TEST_DB_DIR: OnceLock<tempfile::TempDir> = OnceLock::new();

    fn init_test_host() {
        let dir = TEST_DB_DIR.get_or_init(|| tempfile::tempdir().expect("temp dir"));
        let path = dir.path().join("todo_ffi_test.sqlite3");
        let response = todo_init(Some(path.to_string_lossy().into_owned()));
        assert!(response.ok, "{}", response.message);
    }

    fn unique_title(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_relative_log_dir() {
        let error = init_logging("info".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn add_then_list_shows_task_first_in_all_and_active() {
        init_test_host();
        let title = unique_title("ffi-add");
        let added = todo_add(title.clone());
        assert!(added.ok, "{}", added.message);
        let id = added.task_id.expect("task id");

        let all = todo_list(None);
        assert!(all.ok);
        assert!(all.items.iter().any(|item| item.id == id && item.title == title));

        let active = todo_list(Some("active".to_string()));
        assert!(active.items.iter().any(|item| item.id == id));
        assert_eq!(active.filter, "active");
    }

    #[test]
    fn blank_title_creates_nothing() {
        init_test_host();
        let response = todo_add("   ".to_string());
        assert!(response.ok);
        assert!(response.task_id.is_none());
    }

    #[test]
    fn unknown_filter_is_reported() {
        init_test_host();
        let response = todo_list(Some("archived".to_string()));
        assert!(!response.ok);
        assert!(response.message.contains("archived"));
    }

    #[test]
    fn toggle_moves_task_to_done_and_clear_respects_answer() {
        init_test_host();
        let id = todo_add(unique_title("ffi-toggle"))
            .task_id
            .expect("task id");
        assert!(todo_toggle(id.clone()).ok);
        assert!(todo_has_completed());

        let done = todo_list(Some("done".to_string()));
        assert!(done.items.iter().any(|item| item.id == id && item.done));

        let cancelled = todo_clear_completed(false);
        assert!(cancelled.ok);
        assert!(todo_list(Some("done".to_string()))
            .items
            .iter()
            .any(|item| item.id == id));

        assert!(todo_clear_completed(true).ok);
        assert!(!todo_list(None).items.iter().any(|item| item.id == id));
        assert!(todo_flush().ok);
    }

    #[test]
    fn delete_unknown_id_is_a_silent_no_op() {
        init_test_host();
        let response = todo_delete("no-such-id".to_string());
        assert!(response.ok);
        assert!(response.task_id.is_none());
        assert_eq!(response.message, "No such task.");
    }

    #[test]
    fn counts_add_up() {
        init_test_host();
        todo_add(unique_title("ffi-counts"));
        let counts = todo_counts();
        assert!(counts.all >= 1);
        assert_eq!(counts.all, counts.active + counts.done);
    }

    #[tokio::test]
    async fn modal_prompts_get_the_answer_dart_collected() {
        let ui_answer = Arc::new(AtomicBool::new(true));
        let (confirmer, prompts) = PlatformConfirmer::select(Platform::Ios, |_: &str| false);
        let host = tokio::spawn(answer_modal_prompts(
            prompts.expect("modal receiver"),
            Arc::clone(&ui_answer),
        ));

        assert!(confirmer.confirm(&ConfirmRequest::clear_completed()).await);
        ui_answer.store(false, Ordering::SeqCst);
        assert!(!confirmer.confirm(&ConfirmRequest::clear_completed()).await);

        drop(confirmer);
        host.await.unwrap();
    }

    #[test]
    fn about_info_lists_tech_stack() {
        let about = about_info();
        assert_eq!(about.title, "About This App");
        assert!(!about.tech_stack.is_empty());
    }
}
