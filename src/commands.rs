use crate::database::TaskStore;
use crate::display::{format_task_details, format_task_list};
use crate::editor::{Editor, ScratchFiles, heading_buffer, heading_title};
use crate::shell::Shell;
use crate::types::{TaskError, TaskId};
use colored::*;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

const WELCOME_MESSAGE: &str = "Welcome to Japari Park!";

/// Everything a shell command can touch during one session.
pub struct Session {
    pub store: TaskStore,
    pub editor: Editor,
    pub scratch: ScratchFiles,
}

impl Session {
    pub fn new(store: TaskStore, editor: Editor) -> Self {
        Session {
            store,
            editor,
            scratch: ScratchFiles::new(),
        }
    }

    /// Closes the store and removes every scratch file, even if closing fails.
    pub fn close(&mut self) -> Result<(), TaskError> {
        let closed = self.store.close();
        let cleared = self.scratch.clear();
        closed?;
        cleared
    }
}

pub fn build_shell() -> Shell<Session, TaskError> {
    let mut shell = Shell::new();
    shell.set_welcome_message(WELCOME_MESSAGE);

    shell.register("list", &[], "show tasks (title only)", |s: &mut Session, _| {
        recover(handle_list(s))
    });
    shell.register("show", &[], "show tasks (all info)", |s: &mut Session, _| {
        recover(handle_show(s))
    });
    shell.register("add", &["title"], "add task", |s: &mut Session, args| {
        recover(handle_add(s, &args[0]))
    });
    shell.register("edit", &["task_id"], "edit task", |s: &mut Session, args| {
        recover(handle_edit(s, &args[0]))
    });
    shell.register("done", &["task_id"], "mark task as done", |s: &mut Session, args| {
        recover(handle_done(s, &args[0]))
    });

    shell.set_start_up(|s: &mut Session| s.store.init_schema());
    shell.set_clean_up(|s: &mut Session| s.close());
    shell
}

/// Turns user-facing errors into the text the shell prints; storage and I/O
/// failures still end the session.
fn recover(result: Result<String, TaskError>) -> Result<String, TaskError> {
    match result {
        Err(e) if !e.is_fatal() => {
            debug!("reported to user: {e}");
            Ok(e.to_string().bright_yellow().to_string())
        }
        other => other,
    }
}

fn handle_list(session: &mut Session) -> Result<String, TaskError> {
    let tasks = session.store.getall(false)?;
    Ok(format_task_list(&tasks))
}

fn handle_show(session: &mut Session) -> Result<String, TaskError> {
    let tasks = session.store.getall(false)?;
    Ok(format_task_details(&tasks))
}

fn handle_add(session: &mut Session, title: &str) -> Result<String, TaskError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TaskError::InvalidInput(
            "task title cannot be empty (usage: add <title>)".to_string(),
        ));
    }

    let path = session.scratch.create(&heading_buffer(title))?;
    let description = session.editor.edit(&path)?.unwrap_or_default();

    let task_id = session.store.add(title, &description)?;
    session.scratch.insert(task_id, path);
    info!(%task_id, "task added");
    Ok(format!("add: {title}").bright_green().to_string())
}

fn handle_edit(session: &mut Session, raw_id: &str) -> Result<String, TaskError> {
    let task_id: TaskId = raw_id.parse()?;
    let task = session
        .store
        .get(task_id)?
        .ok_or_else(|| TaskError::NotFound(raw_id.to_string()))?;

    let path = session.scratch.get_or_create(task_id, || {
        if task.description.is_empty() {
            heading_buffer(&task.title)
        } else {
            task.description.clone()
        }
    })?;

    let Some(description) = session.editor.edit(path)? else {
        return Ok("update failed".bright_yellow().to_string());
    };

    let title = heading_title(&description).unwrap_or(task.title);
    session.store.update(task_id, &title, &description)?;
    info!(%task_id, "task edited");
    Ok(format!("update: {title}").bright_green().to_string())
}

fn handle_done(session: &mut Session, raw_id: &str) -> Result<String, TaskError> {
    let task_id: TaskId = raw_id.parse()?;
    let task = session
        .store
        .get(task_id)?
        .ok_or_else(|| TaskError::NotFound(raw_id.to_string()))?;

    session.store.done(task_id)?;
    info!(%task_id, "task done");
    Ok(format!("done: {}", task.title).bright_green().to_string())
}

/// `todo table`: creates the table, or recreates it empty with `reset`.
pub fn init_table(db_path: &Path, reset: bool) -> Result<(), TaskError> {
    let mut store = TaskStore::open(db_path)?;

    if reset {
        print!("This deletes every task in {}. Continue? (y/N): ", db_path.display());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !matches!(input.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("{}", "table reset cancelled".bright_yellow());
            return store.close();
        }
        store.reset_schema()?;
        println!("{}", "task table recreated".bright_green());
    } else {
        store.init_schema()?;
        println!("{} {}", "task table ready at".bright_green(), db_path.display());
    }
    store.close()
}
