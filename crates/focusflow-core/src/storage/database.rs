//! SQLite-based storage for the task list and daily summaries.
//!
//! Provides persistent storage for:
//! - The short task list
//! - Per-day focus totals (one row per local date)

use std::path::Path;

use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::data_dir;
use crate::error::{Result, StorageError, ValidationError};
use crate::summary::{DailySummary, SummaryProgress, SummarySink};
use crate::tasks::{validate_new_title, Task};

/// SQLite database for tasks and daily summaries.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/focusflow/focusflow.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("focusflow.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS tasks (
                    id          TEXT PRIMARY KEY,
                    title       TEXT NOT NULL,
                    is_done     INTEGER NOT NULL DEFAULT 0,
                    created_at  TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS daily_summary (
                    date                TEXT PRIMARY KEY,
                    focus_seconds       INTEGER NOT NULL DEFAULT 0,
                    completed_sessions  INTEGER NOT NULL DEFAULT 0
                );",
            )
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// All tasks in insertion order.
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, is_done, created_at FROM tasks ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut tasks = Vec::new();
        for row in rows {
            let (id, title, is_done, created_at) = row?;
            tasks.push(Task {
                id: parse_uuid(&id)?,
                title,
                is_done,
                created_at: parse_timestamp(&created_at)?,
            });
        }
        Ok(tasks)
    }

    /// Add a task after validating its title against the current list.
    pub fn add_task(&self, title: &str) -> Result<Task> {
        let existing = self.list_tasks()?;
        let task = Task::new(validate_new_title(&existing, title)?);
        self.conn.execute(
            "INSERT INTO tasks (id, title, is_done, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                task.id.to_string(),
                task.title,
                task.is_done,
                task.created_at.to_rfc3339(),
            ],
        )?;
        Ok(task)
    }

    /// Flip a task's done flag and return the updated task.
    pub fn toggle_task(&self, id: Uuid) -> Result<Task> {
        let changed = self.conn.execute(
            "UPDATE tasks SET is_done = NOT is_done WHERE id = ?1",
            params![id.to_string()],
        )?;
        if changed == 0 {
            return Err(task_not_found(id));
        }
        self.get_task(id)?.ok_or_else(|| task_not_found(id))
    }

    pub fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        let row = self
            .conn
            .query_row(
                "SELECT title, is_done, created_at FROM tasks WHERE id = ?1",
                params![id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, bool>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;
        match row {
            Some((title, is_done, created_at)) => Ok(Some(Task {
                id,
                title,
                is_done,
                created_at: parse_timestamp(&created_at)?,
            })),
            None => Ok(None),
        }
    }

    pub fn remove_task(&self, id: Uuid) -> Result<()> {
        let removed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])?;
        if removed == 0 {
            return Err(task_not_found(id));
        }
        Ok(())
    }

    /// Remove every task. Returns how many were removed.
    pub fn clear_tasks(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM tasks", [])?)
    }

    // ── Daily summary ────────────────────────────────────────────────

    /// Today's totals (local date). A day with no row yet reads as empty.
    pub fn summary_today(&self) -> Result<DailySummary> {
        self.summary_on(today())
    }

    pub fn summary_on(&self, date: NaiveDate) -> Result<DailySummary> {
        let row = self
            .conn
            .query_row(
                "SELECT focus_seconds, completed_sessions FROM daily_summary WHERE date = ?1",
                params![date.to_string()],
                |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u32>(1)?)),
            )
            .optional()?;
        Ok(match row {
            Some((focus_seconds, completed_focus_sessions)) => DailySummary {
                date,
                focus_seconds,
                completed_focus_sessions,
            },
            None => DailySummary::empty(date),
        })
    }

    /// Recorded days, most recent first, at most `days` entries.
    pub fn summary_history(&self, days: usize) -> Result<Vec<DailySummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, focus_seconds, completed_sessions
             FROM daily_summary
             ORDER BY date DESC
             LIMIT ?1",
        )?;
        let limit = i64::try_from(days).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, u32>(2)?,
            ))
        })?;

        let mut history = Vec::new();
        for row in rows {
            let (date, focus_seconds, completed_focus_sessions) = row?;
            history.push(DailySummary {
                date: parse_date(&date)?,
                focus_seconds,
                completed_focus_sessions,
            });
        }
        Ok(history)
    }

    /// Add progress to today's row. A new local day starts from zero.
    pub fn add_focus_progress(&self, progress: SummaryProgress) -> Result<DailySummary> {
        self.add_focus_progress_on(today(), progress)
    }

    pub fn add_focus_progress_on(
        &self,
        date: NaiveDate,
        progress: SummaryProgress,
    ) -> Result<DailySummary> {
        self.conn.execute(
            "INSERT INTO daily_summary (date, focus_seconds, completed_sessions)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(date) DO UPDATE SET
                focus_seconds = focus_seconds + excluded.focus_seconds,
                completed_sessions = completed_sessions + excluded.completed_sessions",
            params![
                date.to_string(),
                progress.focus_seconds,
                progress.completed_sessions
            ],
        )?;
        self.summary_on(date)
    }

    /// Zero today's totals.
    pub fn reset_today(&self) -> Result<()> {
        self.reset_on(today())
    }

    pub fn reset_on(&self, date: NaiveDate) -> Result<()> {
        self.conn.execute(
            "INSERT INTO daily_summary (date, focus_seconds, completed_sessions)
             VALUES (?1, 0, 0)
             ON CONFLICT(date) DO UPDATE SET focus_seconds = 0, completed_sessions = 0",
            params![date.to_string()],
        )?;
        Ok(())
    }
}

impl SummarySink for Database {
    fn record(&self, progress: SummaryProgress) -> Result<()> {
        self.add_focus_progress(progress).map(|_| ())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn task_not_found(id: Uuid) -> crate::error::CoreError {
    ValidationError::NotFound {
        kind: "task".into(),
        id: id.to_string(),
    }
    .into()
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s)
        .map_err(|e| StorageError::QueryFailed(format!("bad task id '{s}': {e}")).into())
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::QueryFailed(format!("bad timestamp '{s}': {e}")).into())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    s.parse::<NaiveDate>()
        .map_err(|e| StorageError::QueryFailed(format!("bad date '{s}': {e}")).into())
}
