use crate::types::{Task, TaskError, TaskId};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Result as SqlResult, params};
use std::path::Path;
use tracing::{debug, info};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS tasks (
    task_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT,
    description TEXT,
    create_at   TIMESTAMP,
    update_at   TIMESTAMP,
    done        INTEGER
)";
const DROP_TABLE: &str = "DROP TABLE IF EXISTS tasks";
const INSERT_TASK: &str =
    "INSERT INTO tasks (title, description, create_at, update_at, done) VALUES (?1, ?2, ?3, ?4, 0)";
const SELECT_TASKS: &str =
    "SELECT task_id, title, description, create_at, update_at, done FROM tasks";
const UPDATE_TASK: &str =
    "UPDATE tasks SET title = ?1, description = ?2, update_at = ?3 WHERE task_id = ?4";
const MARK_DONE: &str = "UPDATE tasks SET done = 1 WHERE task_id = ?1";

pub struct TaskStore {
    conn: Option<Connection>,
}

impl TaskStore {
    pub fn open(path: &Path) -> Result<Self, TaskError> {
        info!("opening task database at {}", path.display());
        let conn = Connection::open(path)?;
        Ok(TaskStore { conn: Some(conn) })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, TaskError> {
        let store = TaskStore {
            conn: Some(Connection::open_in_memory()?),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Creates the `tasks` table when it does not exist yet.
    pub fn init_schema(&self) -> Result<(), TaskError> {
        self.conn()?.execute(CREATE_TABLE, [])?;
        Ok(())
    }

    /// Drops every task and recreates an empty table.
    pub fn reset_schema(&self) -> Result<(), TaskError> {
        let conn = self.conn()?;
        conn.execute(DROP_TABLE, [])?;
        conn.execute(CREATE_TABLE, [])?;
        info!("task table recreated");
        Ok(())
    }

    pub fn add(&self, title: &str, description: &str) -> Result<TaskId, TaskError> {
        let conn = self.conn()?;
        let now = now_timestamp();
        conn.execute(INSERT_TASK, params![title, description, now, now])?;
        let task_id = TaskId(conn.last_insert_rowid());
        debug!(%task_id, "task inserted");
        Ok(task_id)
    }

    /// Returns `None` when no task carries `task_id`.
    pub fn get(&self, task_id: TaskId) -> Result<Option<Task>, TaskError> {
        let mut stmt = self
            .conn()?
            .prepare(&format!("{SELECT_TASKS} WHERE task_id = ?1"))?;
        let mut rows = stmt.query_map([task_id.0], row_to_task)?;

        match rows.next() {
            Some(task) => Ok(Some(task?)),
            None => Ok(None),
        }
    }

    /// All tasks with the given completion flag, oldest id first.
    pub fn getall(&self, done: bool) -> Result<Vec<Task>, TaskError> {
        let mut stmt = self
            .conn()?
            .prepare(&format!("{SELECT_TASKS} WHERE done = ?1 ORDER BY task_id ASC"))?;
        let rows = stmt.query_map([done], row_to_task)?;

        let mut task_list = Vec::new();
        for row in rows {
            task_list.push(row?);
        }
        Ok(task_list)
    }

    /// Overwrites title and description. Returns `false` without error when
    /// the id matches nothing.
    pub fn update(&self, task_id: TaskId, title: &str, description: &str) -> Result<bool, TaskError> {
        let changed = self.conn()?.execute(
            UPDATE_TASK,
            params![title, description, now_timestamp(), task_id.0],
        )?;
        debug!(%task_id, changed, "task updated");
        Ok(changed > 0)
    }

    pub fn done(&self, task_id: TaskId) -> Result<bool, TaskError> {
        let changed = self.conn()?.execute(MARK_DONE, [task_id.0])?;
        debug!(%task_id, changed, "task marked done");
        Ok(changed > 0)
    }

    /// Closes the connection; later calls fail with `StoreClosed`.
    pub fn close(&mut self) -> Result<(), TaskError> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, err)| TaskError::Database(err))?;
            info!("task database closed");
        }
        Ok(())
    }

    fn conn(&self) -> Result<&Connection, TaskError> {
        self.conn.as_ref().ok_or(TaskError::StoreClosed)
    }
}

// Stored in UTC so a wall-clock change never moves update_at before create_at.
fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(idx: usize, raw: &str) -> SqlResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|dt| dt.and_utc())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_task(row: &rusqlite::Row) -> SqlResult<Task> {
    let create_at: String = row.get(3)?;
    let update_at: String = row.get(4)?;

    Ok(Task {
        task_id: TaskId(row.get(0)?),
        title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        create_at: parse_timestamp(3, &create_at)?,
        update_at: parse_timestamp(4, &update_at)?,
        done: row.get(5)?,
    })
}
