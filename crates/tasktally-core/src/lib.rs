//! # Tasktally Core Library
//!
//! Business logic for Tasktally, a personal categorized to-do tracker. The
//! `tasktally` CLI is a thin host over this crate: it fetches tasks from
//! storage, runs the streak engine over them and renders the result.
//!
//! ## Architecture
//!
//! - **Task model**: the task record plus create/update validation and
//!   quick-add parsing
//! - **Stats**: a pure aggregation engine computing today's completions,
//!   per-category day streaks and the Monday-Sunday heatmap
//! - **Focus**: a per-task focus session timer driven by wall-clock ticks
//! - **Storage**: SQLite task store and TOML configuration
//!
//! ## Key Components
//!
//! - [`StreakAggregator`]: streak and heatmap computation
//! - [`TaskDb`]: task persistence
//! - [`Config`]: application configuration management
//!
//! ## Assumptions
//!
//! Every task record carries a creation timestamp; the store guarantees it.
//! A task's completion day is its last modification time (or creation time
//! when it was never modified), truncated to the calendar day of the
//! aggregator's time zone.

pub mod error;
pub mod focus;
pub mod stats;
pub mod storage;
pub mod task;

pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use focus::{FocusEvent, FocusState, FocusStatus, FocusTimer};
pub use stats::{
    render_text, streak_message, DayIntensity, IntensityLevel, StreakAggregator, StreakSummary,
    StreakTier,
};
pub use storage::{CategoryCount, Config, TaskDb, DEFAULT_FETCH_LIMIT};
pub use task::{parse_quick_add, NewTask, Task, TaskPatch};
