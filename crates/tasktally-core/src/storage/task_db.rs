//! SQLite-based storage for tasks.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::data_dir;
use super::migrations;
use crate::error::{CoreError, DatabaseError, Result};
use crate::focus::FocusTimer;
use crate::task::{normalize_category, validate_task_id, NewTask, Task, TaskPatch};

/// Most tasks returned by one listing, newest first.
pub const DEFAULT_FETCH_LIMIT: usize = 200;

const LAST_USED_CATEGORY_KEY: &str = "last_used_category";
const FOCUS_TIMER_KEY_PREFIX: &str = "focus_timer:";

const TASK_COLUMNS: &str = "id, title, description, category, is_done, created_at, updated_at";

/// Number of tasks filed under one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Fixed-width UTC timestamps so text ordering matches time ordering.
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            tracing::warn!(column = idx, value = raw, "unparsable stored timestamp");
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Build a Task from a row selected with [`TASK_COLUMNS`].
fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
    let created_at: String = row.get(5)?;
    let updated_at: Option<String> = row.get(6)?;

    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        is_done: row.get(4)?,
        created_at: parse_timestamp(5, &created_at)?,
        updated_at: updated_at
            .as_deref()
            .map(|raw| parse_timestamp(6, raw))
            .transpose()?,
    })
}

/// Current time at the precision timestamps are stored with, so a returned
/// record equals what a later read yields.
fn stored_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn focus_timer_key(task_id: &str) -> String {
    format!("{FOCUS_TIMER_KEY_PREFIX}{task_id}")
}

/// SQLite database for task storage.
pub struct TaskDb {
    conn: Connection,
}

impl TaskDb {
    /// Open the task database at `<data_dir>/tasktally.db`.
    ///
    /// Creates tables if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(data_dir()?.join("tasktally.db"))
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // === Task CRUD ===

    /// Validate and insert a new task stamped with the current time.
    pub fn create_task(&self, input: NewTask) -> Result<Task> {
        self.create_task_at(input, stored_now())
    }

    /// Validate and insert a new task created at `now`.
    pub fn create_task_at(&self, input: NewTask, now: DateTime<Utc>) -> Result<Task> {
        let task = Task::new(input.validate()?, now);
        self.insert_task(&task)?;
        tracing::info!(id = %task.id, category = %task.category, "task created");
        Ok(task)
    }

    /// Insert a fully-formed task record as-is.
    ///
    /// Used for imports; callers are responsible for the record's validity.
    pub fn insert_task(&self, task: &Task) -> Result<()> {
        self.conn.execute(
            &format!("INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                task.id,
                task.title,
                task.description,
                task.category,
                task.is_done,
                format_timestamp(&task.created_at),
                task.updated_at.as_ref().map(format_timestamp),
            ],
        )?;
        Ok(())
    }

    pub fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    /// Tasks newest-first by creation time, optionally for one category.
    pub fn list_tasks(&self, category: Option<&str>, limit: usize) -> Result<Vec<Task>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let category = category.map(|c| c.trim().to_lowercase());

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE (?1 IS NULL OR category = ?1)
             ORDER BY created_at DESC, id ASC
             LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![category, limit], row_to_task)?;
        let tasks = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Apply a patch to an existing task, stamping `updated_at` with now.
    pub fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Task> {
        self.update_task_at(id, patch, stored_now())
    }

    /// Apply a patch as of `now`.
    ///
    /// An empty patch, or one that leaves every field as it was, writes
    /// nothing and returns the stored task untouched.
    pub fn update_task_at(&self, id: &str, patch: TaskPatch, now: DateTime<Utc>) -> Result<Task> {
        validate_task_id(id)?;
        let patch = patch.validate()?;
        let mut task = self.get_task(id)?.ok_or_else(|| CoreError::NotFound {
            id: id.to_string(),
        })?;

        if patch.is_empty() || !task.apply(patch, now) {
            tracing::debug!(id = %task.id, "update left task unchanged");
            return Ok(task);
        }
        self.conn.execute(
            "UPDATE tasks
             SET title = ?2, description = ?3, category = ?4, is_done = ?5, updated_at = ?6
             WHERE id = ?1",
            params![
                task.id,
                task.title,
                task.description,
                task.category,
                task.is_done,
                task.updated_at.as_ref().map(format_timestamp),
            ],
        )?;
        tracing::info!(id = %task.id, is_done = task.is_done, "task updated");
        Ok(task)
    }

    pub fn delete_task(&self, id: &str) -> Result<()> {
        validate_task_id(id)?;
        let deleted = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(CoreError::NotFound { id: id.to_string() });
        }
        self.clear_focus_timer(id)?;
        tracing::info!(id, "task deleted");
        Ok(())
    }

    /// Task counts per category, most populated first.
    pub fn category_counts(&self) -> Result<Vec<CategoryCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, COUNT(*) AS n
             FROM tasks
             GROUP BY category
             ORDER BY n DESC, category ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CategoryCount {
                category: row.get(0)?,
                count: row.get(1)?,
            })
        })?;
        let counts = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    // === Key/value ===

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a value from the kv store.
    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    // === Focus timers ===

    /// Saved focus timer for a task, if one is in progress.
    ///
    /// A stored timer that no longer parses is discarded.
    pub fn load_focus_timer(&self, task_id: &str) -> Result<Option<FocusTimer>> {
        let Some(json) = self.kv_get(&focus_timer_key(task_id))? else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(timer) => Ok(Some(timer)),
            Err(e) => {
                tracing::warn!(task_id, error = %e, "discarding unreadable focus timer");
                Ok(None)
            }
        }
    }

    pub fn save_focus_timer(&self, timer: &FocusTimer) -> Result<()> {
        let json = serde_json::to_string(timer)?;
        self.kv_set(&focus_timer_key(timer.task_id()), &json)
    }

    pub fn clear_focus_timer(&self, task_id: &str) -> Result<()> {
        self.kv_delete(&focus_timer_key(task_id))
    }

    // === Preferences ===

    /// Category quick-add falls back to when the text carries no `#tag`.
    pub fn last_used_category(&self) -> Result<Option<String>> {
        self.kv_get(LAST_USED_CATEGORY_KEY)
    }

    pub fn set_last_used_category(&self, category: &str) -> Result<()> {
        let category = normalize_category(category)?;
        self.kv_set(LAST_USED_CATEGORY_KEY, &category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn create_and_get_task() {
        let db = TaskDb::open_memory().unwrap();
        let task = db
            .create_task_at(NewTask::new(" Write tests ", "Work"), t0())
            .unwrap();

        let retrieved = db.get_task(&task.id).unwrap().unwrap();
        assert_eq!(retrieved, task);
        assert_eq!(retrieved.title, "Write tests");
        assert_eq!(retrieved.category, "work");
        assert!(!retrieved.is_done);
        assert_eq!(retrieved.updated_at, Some(t0()));
    }

    #[test]
    fn returned_task_matches_stored_task() {
        let db = TaskDb::open_memory().unwrap();
        let created = db.create_task(NewTask::new("a", "work")).unwrap();
        assert_eq!(db.get_task(&created.id).unwrap(), Some(created.clone()));

        let updated = db.update_task(&created.id, TaskPatch::done(true)).unwrap();
        assert_eq!(db.get_task(&created.id).unwrap(), Some(updated));
    }

    #[test]
    fn create_rejects_invalid_input() {
        let db = TaskDb::open_memory().unwrap();
        let err = db.create_task(NewTask::new("", "work")).unwrap_err();
        assert_eq!(err.code(), "MISSING_FIELDS");
        assert!(db.list_tasks(None, DEFAULT_FETCH_LIMIT).unwrap().is_empty());
    }

    #[test]
    fn list_is_newest_first_and_capped() {
        let db = TaskDb::open_memory().unwrap();
        for i in 0..5 {
            db.create_task_at(NewTask::new(format!("task {i}"), "work"), t0() + Duration::minutes(i))
                .unwrap();
        }

        let tasks = db.list_tasks(None, 3).unwrap();
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["task 4", "task 3", "task 2"]);
    }

    #[test]
    fn list_filters_by_category() {
        let db = TaskDb::open_memory().unwrap();
        db.create_task_at(NewTask::new("a", "work"), t0()).unwrap();
        db.create_task_at(NewTask::new("b", "home"), t0()).unwrap();

        let tasks = db.list_tasks(Some("WORK"), DEFAULT_FETCH_LIMIT).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "a");
    }

    #[test]
    fn update_task() {
        let db = TaskDb::open_memory().unwrap();
        let task = db.create_task_at(NewTask::new("a", "work"), t0()).unwrap();
        let later = t0() + Duration::hours(5);

        let updated = db.update_task_at(&task.id, TaskPatch::done(true), later).unwrap();
        assert!(updated.is_done);
        assert_eq!(updated.updated_at, Some(later));

        let retrieved = db.get_task(&task.id).unwrap().unwrap();
        assert_eq!(retrieved, updated);
        assert_eq!(retrieved.created_at, t0());
    }

    #[test]
    fn noop_update_keeps_completion_day() {
        let db = TaskDb::open_memory().unwrap();
        let task = db.create_task_at(NewTask::new("a", "work"), t0()).unwrap();
        let done_at = t0() + Duration::hours(1);
        db.update_task_at(&task.id, TaskPatch::done(true), done_at).unwrap();

        let three_days_later = t0() + Duration::days(3);
        let untouched = db
            .update_task_at(&task.id, TaskPatch::default(), three_days_later)
            .unwrap();
        assert_eq!(untouched.updated_at, Some(done_at));

        let again = db
            .update_task_at(&task.id, TaskPatch::done(true), three_days_later)
            .unwrap();
        assert_eq!(again.updated_at, Some(done_at));

        let tasks = db.list_tasks(None, DEFAULT_FETCH_LIMIT).unwrap();
        let aggregator = crate::StreakAggregator::at(three_days_later);
        assert_eq!(aggregator.today_count(&tasks), 0);
        assert_eq!(aggregator.category_streak(&tasks, "work"), 0);
    }

    #[test]
    fn update_errors() {
        let db = TaskDb::open_memory().unwrap();
        let err = db.update_task("bogus", TaskPatch::done(true)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::InvalidId)));

        let missing = crate::task::generate_task_id();
        let err = db.update_task(&missing, TaskPatch::done(true)).unwrap_err();
        assert_eq!(err.code(), "TASK_NOT_FOUND");
    }

    #[test]
    fn delete_task() {
        let db = TaskDb::open_memory().unwrap();
        let task = db.create_task(NewTask::new("a", "work")).unwrap();

        db.delete_task(&task.id).unwrap();
        assert!(db.get_task(&task.id).unwrap().is_none());

        let err = db.delete_task(&task.id).unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn category_counts_sorted() {
        let db = TaskDb::open_memory().unwrap();
        for (title, category) in [("a", "work"), ("b", "home"), ("c", "work"), ("d", "gym")] {
            db.create_task(NewTask::new(title, category)).unwrap();
        }

        let counts = db.category_counts().unwrap();
        let flat: Vec<_> = counts.iter().map(|c| (c.category.as_str(), c.count)).collect();
        assert_eq!(flat, vec![("work", 2), ("gym", 1), ("home", 1)]);
    }

    #[test]
    fn kv_store() {
        let db = TaskDb::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }

    #[test]
    fn focus_timer_persists_per_task() {
        let db = TaskDb::open_memory().unwrap();
        let a = db.create_task(NewTask::new("a", "work")).unwrap();
        let b = db.create_task(NewTask::new("b", "work")).unwrap();

        let mut timer = FocusTimer::new(&a.id, 60);
        timer.start(t0());
        timer.tick(t0() + Duration::seconds(15));
        db.save_focus_timer(&timer).unwrap();

        assert_eq!(db.load_focus_timer(&a.id).unwrap(), Some(timer));
        assert_eq!(db.load_focus_timer(&b.id).unwrap(), None);

        db.clear_focus_timer(&a.id).unwrap();
        assert_eq!(db.load_focus_timer(&a.id).unwrap(), None);
    }

    #[test]
    fn focus_timer_goes_away_with_its_task() {
        let db = TaskDb::open_memory().unwrap();
        let task = db.create_task(NewTask::new("a", "work")).unwrap();
        db.save_focus_timer(&FocusTimer::new(&task.id, 60)).unwrap();

        db.delete_task(&task.id).unwrap();
        assert_eq!(db.load_focus_timer(&task.id).unwrap(), None);
    }

    #[test]
    fn unreadable_focus_timer_is_discarded() {
        let db = TaskDb::open_memory().unwrap();
        let id = crate::task::generate_task_id();
        db.kv_set(&focus_timer_key(&id), "{not json").unwrap();
        assert_eq!(db.load_focus_timer(&id).unwrap(), None);
    }

    #[test]
    fn last_used_category_is_normalized() {
        let db = TaskDb::open_memory().unwrap();
        assert_eq!(db.last_used_category().unwrap(), None);
        db.set_last_used_category("Side Hustle").unwrap();
        assert_eq!(db.last_used_category().unwrap().as_deref(), Some("side hustle"));
        assert!(db.set_last_used_category("no_underscores").is_err());
    }

    #[test]
    fn missing_updated_at_round_trips() {
        let db = TaskDb::open_memory().unwrap();
        let mut task = Task::new(NewTask::new("legacy", "work"), t0());
        task.updated_at = None;
        task.is_done = true;
        db.insert_task(&task).unwrap();

        let retrieved = db.get_task(&task.id).unwrap().unwrap();
        assert_eq!(retrieved.updated_at, None);
        assert_eq!(retrieved.completion_time(), t0());
    }
}
