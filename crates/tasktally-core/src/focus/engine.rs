//! Per-task focus session timer.
//!
//! A wall-clock state machine with no internal thread. Every command takes
//! the current moment, and the caller calls `tick()` to catch up on time
//! that passed since the last call; that is where completion is detected.
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!        Completed -> (start) Running
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// State changes reported by [`FocusTimer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FocusEvent {
    FocusStarted {
        task_id: String,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    FocusPaused {
        task_id: String,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    FocusReset {
        task_id: String,
        at: DateTime<Utc>,
    },
    FocusCompleted {
        task_id: String,
        at: DateTime<Utc>,
    },
}

/// Point-in-time view of a timer for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusStatus {
    pub task_id: String,
    pub state: FocusState,
    pub remaining_ms: u64,
    /// `MM:SS`, rounded up to the next whole second.
    pub remaining: String,
    pub progress_pct: f64,
}

/// Focus session bound to one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusTimer {
    task_id: String,
    state: FocusState,
    duration_ms: u64,
    remaining_ms: u64,
    /// Moment the running timer last accounted for elapsed time.
    #[serde(default)]
    last_tick: Option<DateTime<Utc>>,
}

impl FocusTimer {
    pub fn new(task_id: impl Into<String>, duration_secs: u64) -> Self {
        let duration_ms = duration_secs.saturating_mul(1000);
        Self {
            task_id: task_id.into(),
            state: FocusState::Idle,
            duration_ms,
            remaining_ms: duration_ms,
            last_tick: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn state(&self) -> FocusState {
        self.state
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// 0.0 .. 100.0 through the session.
    pub fn progress_pct(&self) -> f64 {
        if self.duration_ms == 0 {
            return if self.state == FocusState::Completed { 100.0 } else { 0.0 };
        }
        let elapsed = self.duration_ms - self.remaining_ms.min(self.duration_ms);
        elapsed as f64 / self.duration_ms as f64 * 100.0
    }

    pub fn status(&self) -> FocusStatus {
        let secs = self.remaining_ms.div_ceil(1000);
        FocusStatus {
            task_id: self.task_id.clone(),
            state: self.state,
            remaining_ms: self.remaining_ms,
            remaining: format!("{:02}:{:02}", secs / 60, secs % 60),
            progress_pct: self.progress_pct(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume. Starting a completed session begins a fresh one.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<FocusEvent> {
        match self.state {
            FocusState::Running => None,
            FocusState::Idle | FocusState::Paused | FocusState::Completed => {
                if self.state == FocusState::Completed {
                    self.remaining_ms = self.duration_ms;
                }
                self.state = FocusState::Running;
                self.last_tick = Some(now);
                Some(FocusEvent::FocusStarted {
                    task_id: self.task_id.clone(),
                    remaining_ms: self.remaining_ms,
                    at: now,
                })
            }
        }
    }

    /// Pause a running session. If the session ran out in the meantime it
    /// completes instead.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<FocusEvent> {
        if self.state != FocusState::Running {
            return None;
        }
        if let Some(completed) = self.tick(now) {
            return Some(completed);
        }
        self.state = FocusState::Paused;
        self.last_tick = None;
        Some(FocusEvent::FocusPaused {
            task_id: self.task_id.clone(),
            remaining_ms: self.remaining_ms,
            at: now,
        })
    }

    pub fn reset(&mut self, now: DateTime<Utc>) -> FocusEvent {
        self.state = FocusState::Idle;
        self.remaining_ms = self.duration_ms;
        self.last_tick = None;
        FocusEvent::FocusReset {
            task_id: self.task_id.clone(),
            at: now,
        }
    }

    /// Account for time elapsed up to `now`. Returns `FocusCompleted` on
    /// the call that runs the session out.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<FocusEvent> {
        if self.state != FocusState::Running {
            return None;
        }
        self.flush_elapsed(now);
        if self.remaining_ms > 0 {
            return None;
        }
        self.state = FocusState::Completed;
        self.last_tick = None;
        Some(FocusEvent::FocusCompleted {
            task_id: self.task_id.clone(),
            at: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now: DateTime<Utc>) {
        if let Some(last) = self.last_tick {
            // A clock that went backwards counts as no time passing.
            let elapsed = u64::try_from((now - last).num_milliseconds()).unwrap_or(0);
            self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
            self.last_tick = Some(now);
        }
    }
}
