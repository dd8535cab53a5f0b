use crate::types::{TaskError, TaskId};
use std::collections::HashMap;
use std::fs;
use std::io::Write as IoWrite;
use std::path::Path;
use std::process::Command;
use tempfile::{Builder, TempPath};
use tracing::{debug, info};

/// The user's text editor, e.g. `vim` or `code --wait`.
#[derive(Debug, Clone)]
pub struct Editor {
    program: String,
    args: Vec<String>,
}

impl Editor {
    pub fn new(command: &str) -> Self {
        let mut parts = command.split_whitespace().map(str::to_string);
        Editor {
            program: parts.next().unwrap_or_default(),
            args: parts.collect(),
        }
    }

    /// Opens `path` and waits for the editor to exit.
    ///
    /// Returns the file contents when the editor exits successfully and `None`
    /// when it exits with a failure status, meaning the edit was abandoned.
    pub fn edit(&self, path: &Path) -> Result<Option<String>, TaskError> {
        debug!(editor = %self.program, path = %path.display(), "launching editor");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .map_err(|e| {
                TaskError::Editor(format!("failed to launch '{}': {}", self.program, e))
            })?;

        if !status.success() {
            info!(%status, "editor exited unsuccessfully, discarding edit");
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }
}

/// Markdown scratch files used for editing, one per task for the session.
#[derive(Default)]
pub struct ScratchFiles {
    files: HashMap<TaskId, TempPath>,
}

impl ScratchFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `initial` to a fresh `.md` file that is not yet tied to a task.
    pub fn create(&self, initial: &str) -> Result<TempPath, TaskError> {
        let mut file = Builder::new().prefix("todo-").suffix(".md").tempfile()?;
        file.write_all(initial.as_bytes())?;
        file.flush()?;
        Ok(file.into_temp_path())
    }

    pub fn get(&self, task_id: TaskId) -> Option<&Path> {
        self.files.get(&task_id).map(|p| &**p)
    }

    pub fn insert(&mut self, task_id: TaskId, path: TempPath) {
        self.files.insert(task_id, path);
    }

    /// The task's scratch file, created from `initial` on first use so that
    /// repeated edits in one session reopen the same file.
    pub fn get_or_create<F>(&mut self, task_id: TaskId, initial: F) -> Result<&Path, TaskError>
    where
        F: FnOnce() -> String,
    {
        if self.get(task_id).is_none() {
            let path = self.create(&initial())?;
            self.insert(task_id, path);
        }
        Ok(&*self.files[&task_id])
    }

    /// Deletes every scratch file, reporting the first failure.
    pub fn clear(&mut self) -> Result<(), TaskError> {
        let mut first_err = None;
        for (task_id, path) in self.files.drain() {
            if let Err(e) = path.close() {
                debug!(%task_id, "could not remove scratch file: {e}");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(TaskError::Io(e)),
            None => Ok(()),
        }
    }
}

/// Title taken from the first line of an edited buffer, with any leading
/// markdown heading markers removed. `None` when that line is blank.
pub fn heading_title(buffer: &str) -> Option<String> {
    let first = buffer.lines().next()?;
    let title = first.trim_start_matches('#').trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Initial buffer for a task that has no description yet.
pub fn heading_buffer(title: &str) -> String {
    format!("# {title}\n")
}
