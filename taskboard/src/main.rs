//! `Taskboard` -- personal task tracker CLI.
//!
//! Talks to `taskboard-server` over HTTP, or to an in-process table with
//! `--memory`. Configuration via CLI flags, environment variables, or
//! config file (`~/.config/taskboard/config.toml`).
//!
//! ```bash
//! # Show the board
//! cargo run --bin taskboard
//!
//! # Create, complete and delete
//! cargo run --bin taskboard -- add --title "Pay rent" --deadline 2026-11-01T09:00:00Z
//! cargo run --bin taskboard -- complete <id>
//! cargo run --bin taskboard -- delete <id>
//!
//! # Point at another server
//! TASKBOARD_URL=http://127.0.0.1:8080 cargo run --bin taskboard -- list
//! ```

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use taskboard::app::{App, Report};
use taskboard::board;
use taskboard::config::{CliArgs, ClientConfig, Command};
use taskboard::notify::ConsoleNotifier;
use taskboard::table::{HttpTable, MemoryTable, TaskTable};
use taskboard::tasks::TaskStore;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Logs go to a file so stdout carries only the board.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    let command = cli.command.clone().unwrap_or(Command::List);
    tracing::info!(?command, memory = cli.memory, "taskboard starting");

    if cli.memory {
        return run(MemoryTable::new(), command, &config).await;
    }
    match HttpTable::new(&config.server_url, config.request_timeout) {
        Ok(table) => run(table, command, &config).await,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until exit so buffered log
/// entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskboard.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Runs one command and prints its result.
async fn run<T: TaskTable>(table: T, command: Command, config: &ClientConfig) -> ExitCode {
    let app = App::new(
        TaskStore::new(table),
        ConsoleNotifier::console(),
        config.timestamp_format.clone(),
    );

    match app.execute(command, ask).await {
        Ok(Report::Board(text)) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Ok(Report::Changed(task)) => {
            print!(
                "{}",
                board::render_card(&task, &Local, &config.timestamp_format)
            );
            ExitCode::SUCCESS
        }
        Ok(Report::Deleted(_)) => ExitCode::SUCCESS,
        Ok(Report::Cancelled) => {
            eprintln!("Deletion cancelled.");
            ExitCode::SUCCESS
        }
        Err(_) => ExitCode::FAILURE,
    }
}

/// Asks a yes/no question on the terminal. Anything but `y`/`yes` is no.
fn ask(question: &str) -> bool {
    let mut stderr = io::stderr();
    if write!(stderr, "{question} [y/N] ")
        .and_then(|()| stderr.flush())
        .is_err()
    {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
