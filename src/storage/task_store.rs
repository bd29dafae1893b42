use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Result as SqliteResult, Row};
use thiserror::Error;

use crate::calendar::{TaskPriority, TaskProjection, TaskStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("Invalid timestamp in store: {0}")]
    InvalidTimestamp(String),
    #[error("Invalid column value in store: {0}")]
    InvalidColumn(String),
    #[error("Task not found: {0}")]
    NotFound(String),
    #[error("Failed to prepare store directory: {0}")]
    IoError(#[from] std::io::Error),
}

/// Read side used by the grid: every task of `owner_id` whose due instant is
/// in `[start, end)`.
#[cfg_attr(test, mockall::automock)]
pub trait TaskSource {
    fn tasks_due_between(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TaskProjection>, StoreError>;
}

pub struct SqliteTaskStore {
    conn: Connection,
}

impl SqliteTaskStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let store = Self::new(Connection::open(path)?);
        store.initialize()?;
        tracing::info!("Opened task store at {}", path.display());
        Ok(store)
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                title TEXT NOT NULL,
                due_at TEXT,
                status TEXT NOT NULL,
                priority TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_owner_due ON tasks (owner_id, due_at)",
            [],
        )?;

        Ok(())
    }

    pub fn store_task(&self, owner_id: &str, task: &TaskProjection) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO tasks (id, owner_id, title, due_at, status, priority)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                &task.id,
                owner_id,
                &task.title,
                task.due_at.map(timestamp),
                task.status.as_str(),
                task.priority.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Stores a new task under a fresh id and returns it.
    pub fn create_task(
        &self,
        owner_id: &str,
        title: &str,
        due_at: Option<DateTime<Utc>>,
        priority: TaskPriority,
    ) -> Result<TaskProjection, StoreError> {
        let mut task = TaskProjection::new(uuid::Uuid::new_v4().to_string(), title)
            .with_priority(priority);
        task.due_at = due_at;

        self.store_task(owner_id, &task)?;
        tracing::debug!("Created task {} for {}", task.id, owner_id);
        Ok(task)
    }

    pub fn load_task(&self, id: &str) -> Result<TaskProjection, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, title, due_at, status, priority FROM tasks WHERE id = ?1",
                [id],
                RawTask::from_row,
            )
            .optional()?;

        let Some(raw) = row else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        raw.into_task()
    }

    pub fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        let removed = self.conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        if removed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn complete_task(&self, id: &str) -> Result<TaskProjection, StoreError> {
        let updated = self.conn.execute(
            "UPDATE tasks SET status = ?1 WHERE id = ?2",
            rusqlite::params![TaskStatus::Done.as_str(), id],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.load_task(id)
    }

    pub fn table_exists(&self, table_name: &str) -> bool {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        );
        result.unwrap_or(0) > 0
    }
}

impl TaskSource for SqliteTaskStore {
    fn tasks_due_between(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TaskProjection>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, due_at, status, priority FROM tasks
             WHERE owner_id = ?1 AND due_at IS NOT NULL AND due_at >= ?2 AND due_at < ?3
             ORDER BY due_at",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![owner_id, timestamp(start), timestamp(end)],
            RawTask::from_row,
        )?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?.into_task()?);
        }

        tracing::debug!(
            "Loaded {} tasks for {} between {} and {}",
            tasks.len(),
            owner_id,
            start,
            end
        );
        Ok(tasks)
    }
}

/// Fixed-width RFC 3339 in UTC so stored timestamps compare lexically.
fn timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

struct RawTask {
    id: String,
    title: String,
    due_at: Option<String>,
    status: String,
    priority: String,
}

impl RawTask {
    fn from_row(row: &Row<'_>) -> SqliteResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            due_at: row.get(2)?,
            status: row.get(3)?,
            priority: row.get(4)?,
        })
    }

    fn into_task(self) -> Result<TaskProjection, StoreError> {
        let status = TaskStatus::parse(&self.status)
            .map_err(|_| StoreError::InvalidColumn(format!("status '{}'", self.status)))?;
        let priority = TaskPriority::parse(&self.priority)
            .map_err(|_| StoreError::InvalidColumn(format!("priority '{}'", self.priority)))?;

        let mut task = TaskProjection::new(self.id, self.title)
            .with_status(status)
            .with_priority(priority);

        if let Some(raw) = self.due_at {
            let due = DateTime::parse_from_rfc3339(&raw)
                .map_err(|_| StoreError::InvalidTimestamp(raw.clone()))?;
            task = task.with_due_at(due.with_timezone(&Utc));
        }

        Ok(task)
    }
}
