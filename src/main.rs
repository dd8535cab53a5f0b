use colored::*;
use std::io;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod database;
mod display;
mod editor;
mod shell;
mod types;

use commands::Session;
use config::Config;
use database::TaskStore;
use editor::Editor;
use types::{TaskError, TodoCommand};

fn main() -> ExitCode {
    init_tracing();

    let command = cli::parse_command();

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.to_string().bright_red());
            ExitCode::FAILURE
        }
    }
}

fn run(command: TodoCommand) -> Result<(), TaskError> {
    let dir = config::todo_dir()?;
    let config = Config::load(&dir)?;
    let db_path = config.database_path(&dir);

    match command {
        TodoCommand::Table { reset } => commands::init_table(&db_path, reset),
        TodoCommand::Shell => {
            let store = TaskStore::open(&db_path)?;
            let mut session = Session::new(store, Editor::new(&config.editor()));
            let mut shell = commands::build_shell();

            let stdin = io::stdin();
            shell.run(&mut session, stdin.lock(), io::stdout())
        }
    }
}

// Quiet by default; RUST_LOG=debug shows dispatched commands and SQL activity.
fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
