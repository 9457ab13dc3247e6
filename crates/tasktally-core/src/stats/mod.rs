//! Statistics module for Tasktally
//!
//! Derived views over a user's task list: today's completion count,
//! per-category completion streaks, and the current week's heatmap.

mod display;
mod streaks;

pub use display::{render_text, streak_message, IntensityLevel, StreakTier};
pub use streaks::{DayIntensity, StreakAggregator, StreakSummary};
