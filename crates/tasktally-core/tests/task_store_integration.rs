//! Integration tests for the on-disk task store.
//!
//! This test file verifies:
//! - Tasks survive reopening the database file
//! - Completing a task through the store credits today's streak
//! - Validation and lookup errors carry their codes

use chrono::{Duration, TimeZone, Utc};
use tasktally_core::{NewTask, StreakAggregator, TaskDb, TaskPatch, DEFAULT_FETCH_LIMIT};

#[test]
fn test_tasks_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasktally.db");

    let id = {
        let db = TaskDb::open_at(&path).unwrap();
        let task = db.create_task(NewTask::new("Buy milk", "personal")).unwrap();
        db.set_last_used_category("personal").unwrap();
        task.id
    };

    let db = TaskDb::open_at(&path).unwrap();
    let task = db.get_task(&id).unwrap().unwrap();
    assert_eq!(task.title, "Buy milk");
    assert_eq!(db.last_used_category().unwrap().as_deref(), Some("personal"));
}

#[test]
fn test_completing_through_store_builds_streak() {
    let db = TaskDb::open_memory().unwrap();
    let monday = Utc.with_ymd_and_hms(2026, 10, 12, 8, 0, 0).unwrap();

    for day in 0..3 {
        let at = monday + Duration::days(day);
        let task = db
            .create_task_at(NewTask::new(format!("standup {day}"), "work"), at)
            .unwrap();
        db.update_task_at(&task.id, TaskPatch::done(true), at + Duration::hours(2))
            .unwrap();
    }
    db.create_task_at(NewTask::new("someday", "reading"), monday).unwrap();

    let tasks = db.list_tasks(None, DEFAULT_FETCH_LIMIT).unwrap();
    let aggregator = StreakAggregator::at(monday + Duration::days(2) + Duration::hours(12));
    let summary = aggregator.summarize(&tasks);

    assert_eq!(summary.today_count, 1);
    assert_eq!(summary.category_streaks["work"], 3);
    assert_eq!(summary.category_streaks["reading"], 0);
    let counts: Vec<usize> = summary.weekly.iter().map(|d| d.count).collect();
    assert_eq!(counts, vec![1, 1, 1, 0, 0, 0, 0]);
}

#[test]
fn test_undoing_completion_removes_credit() {
    let db = TaskDb::open_memory().unwrap();
    let now = Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap();
    let task = db.create_task_at(NewTask::new("stretch", "health"), now).unwrap();
    db.update_task_at(&task.id, TaskPatch::done(true), now).unwrap();
    db.update_task_at(&task.id, TaskPatch::done(false), now).unwrap();

    let tasks = db.list_tasks(Some("health"), DEFAULT_FETCH_LIMIT).unwrap();
    let summary = StreakAggregator::at(now).summarize(&tasks);
    assert_eq!(summary.today_count, 0);
    assert_eq!(summary.category_streaks["health"], 0);
}

#[test]
fn test_error_codes() {
    let db = TaskDb::open_memory().unwrap();

    let err = db
        .create_task(NewTask::new("x".repeat(121), "work"))
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_TITLE");

    let err = db.create_task(NewTask::new("ok", "bad_category")).unwrap_err();
    assert_eq!(err.code(), "INVALID_CATEGORY");

    let err = db.delete_task("123").unwrap_err();
    assert_eq!(err.code(), "INVALID_ID");
    assert_eq!(err.status_code(), 400);

    let task = db.create_task(NewTask::new("ok", "work")).unwrap();
    let err = db
        .update_task(
            &task.id,
            TaskPatch {
                description: Some("d".repeat(501)),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_DESCRIPTION");
}

#[test]
fn test_category_counts_and_filter() {
    let db = TaskDb::open_memory().unwrap();
    for (title, category) in [("a", "work"), ("b", "Work"), ("c", "home")] {
        db.create_task(NewTask::new(title, category)).unwrap();
    }

    let counts = db.category_counts().unwrap();
    assert_eq!(counts[0].category, "work");
    assert_eq!(counts[0].count, 2);
    assert_eq!(db.list_tasks(Some(" work "), 10).unwrap().len(), 2);
}
