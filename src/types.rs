use chrono::{DateTime, Utc};
use std::str::FromStr;
use std::{fmt, io};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("task store is closed")]
    StoreClosed,
    #[error("{0} is not found.")]
    NotFound(String),
    #[error("Invalid task id: {0}")]
    InvalidId(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Editor error: {0}")]
    Editor(String),
}

impl TaskError {
    /// Fatal errors end the session; everything else is reported to the user
    /// and the shell keeps going.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TaskError::Database(_) | TaskError::Io(_) | TaskError::Config(_) | TaskError::StoreClosed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(TaskId)
            .map_err(|_| TaskError::InvalidId(format!("'{}' is not a number", s)))
    }
}

#[derive(Clone, Debug)]
pub struct Task {
    pub task_id: TaskId,
    pub title: String,
    pub description: String,
    pub create_at: DateTime<Utc>,
    pub update_at: DateTime<Utc>,
    pub done: bool,
}

#[derive(Debug, PartialEq)]
pub enum TodoCommand {
    Shell,
    Table { reset: bool },
}
