//! Focus session command for CLI.
//!
//! The session state lives in the task store between invocations. Each run
//! first catches the timer up to the current time, so a session that ran
//! out while nobody was looking completes (and marks its task done) on the
//! next command.

use chrono::Utc;
use clap::ValueEnum;
use serde::Serialize;
use tasktally_core::task::validate_task_id;
use tasktally_core::{
    Config, CoreError, FocusEvent, FocusStatus, FocusTimer, Result, TaskDb, TaskPatch,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FocusCommand {
    /// Start the session, or resume a paused one
    #[value(alias = "resume")]
    Start,
    /// Pause a running session
    Pause,
    /// Abandon the session and forget its progress
    Reset,
    /// Show the session
    Status,
}

#[derive(Serialize)]
struct FocusReport {
    title: String,
    #[serde(flatten)]
    status: FocusStatus,
    events: Vec<FocusEvent>,
    /// The task was marked done by this invocation.
    task_completed: bool,
}

pub fn run(db: &TaskDb, id: &str, command: FocusCommand, json: bool) -> Result<()> {
    validate_task_id(id)?;
    let task = db.get_task(id)?.ok_or_else(|| CoreError::NotFound { id: id.to_string() })?;
    let now = Utc::now();

    let mut timer = match db.load_focus_timer(id)? {
        Some(timer) => timer,
        None => FocusTimer::new(id, Config::load()?.focus.duration_secs),
    };

    let mut events: Vec<FocusEvent> = timer.tick(now).into_iter().collect();
    match command {
        FocusCommand::Start => events.extend(timer.start(now)),
        FocusCommand::Pause => events.extend(timer.pause(now)),
        FocusCommand::Reset => events.push(timer.reset(now)),
        FocusCommand::Status => {}
    }

    if command == FocusCommand::Reset {
        db.clear_focus_timer(id)?;
    } else {
        db.save_focus_timer(&timer)?;
    }
    for event in &events {
        tracing::info!(?event, "focus session");
    }

    let finished = events
        .iter()
        .any(|event| matches!(event, FocusEvent::FocusCompleted { .. }));
    let task_completed = finished && !task.is_done;
    if task_completed {
        db.update_task(id, TaskPatch::done(true))?;
    }

    let report = FocusReport {
        title: task.title,
        status: timer.status(),
        events,
        task_completed,
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{}  {:?}  Focus on: {}",
            report.status.remaining,
            report.status.state,
            report.title
        );
        if finished {
            println!("Great job! Session completed.");
        }
        if task_completed {
            println!("Task marked done.");
        }
    }
    Ok(())
}
