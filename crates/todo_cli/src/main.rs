//! Command-line front end for the to-do core.
//!
//! # Responsibility
//! - Run one controller operation per invocation against the SQLite store.
//! - Confirm clear-completed on stdin, through the presentation the
//!   configured platform selects.

use clap::{Parser, Subcommand};
use log::{info, warn};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use todo_core::navigation::{
    ABOUT_BODY, ABOUT_TECH_STACK, ABOUT_TITLE, EMPTY_LIST_TEXT, TODO_SUBTITLE, TODO_TITLE,
};
use todo_core::{
    init_logging, ClearOutcome, CoreConfig, ModalPrompt, Navigator, PlatformConfirmer, Screen,
    SqliteStore, TaskFilter, TaskId, TaskListController,
};
use tokio::sync::mpsc;

#[derive(Debug, Parser)]
#[command(name = "todo", version, about = "Local to-do list")]
struct Cli {
    /// SQLite database file (defaults to TODO_DB_PATH or the temp dir).
    #[arg(long, global = true, env = "TODO_DB_PATH")]
    db: Option<PathBuf>,

    /// Directory for rolling log files; logging is off when unset.
    #[arg(long, global = true, env = "TODO_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "TODO_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a task to the top of the list.
    Add { title: Vec<String> },
    /// Show tasks.
    List {
        #[arg(long, short, default_value_t = TaskFilter::All)]
        filter: TaskFilter,
    },
    /// Flip a task between active and done.
    Toggle { id: String },
    /// Remove a task.
    Delete { id: String },
    /// Remove all done tasks after confirmation.
    ClearDone {
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    /// Show information about this app.
    About,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::List { .. } => "list",
            Self::Toggle { .. } => "toggle",
            Self::Delete { .. } => "delete",
            Self::ClearDone { .. } => "clear-done",
            Self::About => "about",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut config = CoreConfig::from_env();
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level;
    }
    if let Some(dir) = cli.log_dir.clone() {
        config.log_dir = Some(dir);
    }

    if let Some(dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(&config.log_level, &dir.to_string_lossy()) {
            eprintln!("logging disabled: {err}");
        }
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(cli.command, config))
}

async fn run(command: Command, config: CoreConfig) -> ExitCode {
    if let Command::About = command {
        let mut navigator = Navigator::new();
        navigator.navigate(Screen::About);
        print_about(navigator.current());
        return ExitCode::SUCCESS;
    }

    let store = match SqliteStore::open(&config.db_path) {
        Ok(store) => store,
        Err(err) => {
            warn!(
                "event=cli_open module=cli status=error db_path={} error={}",
                config.db_path.display(),
                err
            );
            eprintln!("cannot open {}: {err}", config.db_path.display());
            return ExitCode::FAILURE;
        }
    };

    let assume_yes = matches!(command, Command::ClearDone { yes: true });
    let (confirmer, prompts) = PlatformConfirmer::select(config.platform, move |text: &str| {
        assume_yes || ask_yes_no(text)
    });
    if let Some(prompts) = prompts {
        tokio::spawn(answer_modal_prompts(prompts, assume_yes));
    }
    let mut controller = TaskListController::new(store, confirmer);
    controller.initialize().await;
    info!(
        "event=cli_command module=cli status=started command={} platform={}",
        command.name(),
        config.platform
    );

    match command {
        Command::Add { title } => match controller.add(&title.join(" ")) {
            Some(id) => println!("added {id}"),
            None => println!("nothing to add"),
        },
        Command::List { filter } => {
            controller.set_filter(filter);
            print_list(&controller);
        }
        Command::Toggle { id } => {
            if !controller.toggle(&TaskId::from(id)) {
                println!("no such task");
            }
        }
        Command::Delete { id } => {
            if !controller.delete(&TaskId::from(id)) {
                println!("no such task");
            }
        }
        Command::ClearDone { .. } => match controller.clear_completed().await {
            ClearOutcome::NothingToClear => println!("nothing to clear"),
            ClearOutcome::Cancelled => println!("cancelled"),
            ClearOutcome::Cleared(count) => println!("cleared {count} task(s)"),
        },
        Command::About => {}
    }

    controller.flush().await;
    ExitCode::SUCCESS
}

/// Renders modal confirmations as a terminal question with the dialog labels.
async fn answer_modal_prompts(
    mut prompts: mpsc::UnboundedReceiver<ModalPrompt>,
    assume_yes: bool,
) {
    while let Some(prompt) = prompts.recv().await {
        let request = &prompt.request;
        let text = format!(
            "{} ({} / {})",
            request.prompt_text(),
            request.confirm_label,
            request.cancel_label
        );
        let confirmed = assume_yes
            || tokio::task::spawn_blocking(move || ask_yes_no(&text))
                .await
                .unwrap_or(false);
        prompt.answer(confirmed);
    }
}

fn print_list(controller: &TaskListController<SqliteStore>) {
    println!("{TODO_TITLE}");
    println!("{TODO_SUBTITLE}");
    let counts = controller.counts();
    let tabs = TaskFilter::ALL
        .iter()
        .map(|filter| {
            let marker = if *filter == controller.filter() { "*" } else { " " };
            format!("{marker}{} ({})", filter.label(), counts.get(*filter))
        })
        .collect::<Vec<_>>()
        .join("  ");
    println!("{tabs}");
    println!();

    let visible = controller.visible();
    if visible.is_empty() {
        println!("{EMPTY_LIST_TEXT}");
        return;
    }
    for task in visible {
        let check = if task.done { "x" } else { " " };
        println!("[{check}] {}  ({})", task.title, task.created_at_display());
        println!("    {}", task.id);
    }
}

fn print_about(screen: Screen) {
    println!("{screen}: {ABOUT_TITLE}");
    println!("{ABOUT_BODY}");
    println!();
    println!("Tech stack:");
    for line in ABOUT_TECH_STACK {
        println!("- {line}");
    }
}

fn ask_yes_no(text: &str) -> bool {
    print!("{text} [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;
    use std::path::Path;
    use todo_core::TaskFilter;

    #[test]
    fn add_joins_words_into_one_title() {
        let cli = Cli::try_parse_from(["todo", "add", "Buy", "milk"]).unwrap();
        match cli.command {
            Command::Add { title } => assert_eq!(title.join(" "), "Buy milk"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn list_defaults_to_all_and_parses_filters() {
        let cli = Cli::try_parse_from(["todo", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::List {
                filter: TaskFilter::All
            }
        ));

        let cli = Cli::try_parse_from(["todo", "list", "--filter", "Done"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::List {
                filter: TaskFilter::Done
            }
        ));

        let cli = Cli::try_parse_from(["todo", "list", "-f", "active"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::List {
                filter: TaskFilter::Active
            }
        ));
    }

    #[test]
    fn unknown_filter_is_rejected() {
        assert!(Cli::try_parse_from(["todo", "list", "--filter", "archived"]).is_err());
    }

    #[test]
    fn id_commands_and_clear_flags_parse() {
        let cli = Cli::try_parse_from(["todo", "toggle", "abc"]).unwrap();
        assert!(matches!(cli.command, Command::Toggle { id } if id == "abc"));

        let cli = Cli::try_parse_from(["todo", "delete", "abc"]).unwrap();
        assert!(matches!(cli.command, Command::Delete { id } if id == "abc"));

        let cli = Cli::try_parse_from(["todo", "clear-done"]).unwrap();
        assert!(matches!(cli.command, Command::ClearDone { yes: false }));

        let cli = Cli::try_parse_from(["todo", "clear-done", "--yes"]).unwrap();
        assert!(matches!(cli.command, Command::ClearDone { yes: true }));

        let cli = Cli::try_parse_from(["todo", "about"]).unwrap();
        assert_eq!(cli.command.name(), "about");
    }

    #[test]
    fn global_db_flag_is_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from(["todo", "list", "--db", "/tmp/todos.sqlite3"]).unwrap();
        assert_eq!(cli.db.as_deref(), Some(Path::new("/tmp/todos.sqlite3")));
    }

    #[test]
    fn missing_subcommand_or_id_is_rejected() {
        assert!(Cli::try_parse_from(["todo"]).is_err());
        assert!(Cli::try_parse_from(["todo", "toggle"]).is_err());
    }
}
