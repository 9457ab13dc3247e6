//! Completion streaks and weekly activity.
//!
//! Everything here is a pure function of the task list and the aggregator's
//! notion of "now". Days are calendar days in the time zone of `now`; a task's
//! day is [`Task::completion_date`], i.e. `updated_at` or else `created_at`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::display::IntensityLevel;
use crate::task::Task;

/// Completions on one day of the current week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayIntensity {
    pub date: NaiveDate,
    pub count: usize,
}

impl DayIntensity {
    /// Heatmap bucket for this day's raw count.
    pub fn level(&self) -> IntensityLevel {
        IntensityLevel::from_count(self.count)
    }
}

/// All derived values for one task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub today: NaiveDate,
    pub today_count: usize,
    /// One entry per category present in the input, including zero streaks.
    pub category_streaks: BTreeMap<String, u32>,
    /// Monday through Sunday of the current week.
    pub weekly: [DayIntensity; 7],
}

impl StreakSummary {
    /// Non-zero streaks, longest first, ties broken by category name.
    pub fn active_streaks(&self) -> Vec<(&str, u32)> {
        let mut active: Vec<_> = self
            .category_streaks
            .iter()
            .filter(|(_, days)| **days > 0)
            .map(|(category, days)| (category.as_str(), *days))
            .collect();
        active.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        active
    }

    pub fn max_streak(&self) -> u32 {
        self.category_streaks.values().copied().max().unwrap_or(0)
    }

    /// Progress bar fill for today: 20% per completion, capped at 100.
    pub fn today_progress_percent(&self) -> u8 {
        self.today_count.saturating_mul(20).min(100) as u8
    }

    pub fn week_total(&self) -> usize {
        self.weekly.iter().map(|day| day.count).sum()
    }
}

/// Computes today's count, per-category streaks and the weekly grid.
///
/// Holds no state besides the reference moment, so a host simply builds one
/// and calls it again whenever its task list changes.
#[derive(Debug, Clone)]
pub struct StreakAggregator<Tz: TimeZone> {
    now: DateTime<Tz>,
}

impl StreakAggregator<Local> {
    /// Aggregator anchored at the host's local clock.
    pub fn local() -> Self {
        Self::at(Local::now())
    }
}

impl<Tz: TimeZone> StreakAggregator<Tz> {
    /// Aggregator anchored at an explicit moment; its zone defines day
    /// boundaries.
    pub fn at(now: DateTime<Tz>) -> Self {
        Self { now }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    /// Monday of the week containing today.
    pub fn week_start(&self) -> NaiveDate {
        let today = self.today();
        today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
    }

    fn completion_date(&self, task: &Task) -> NaiveDate {
        task.completion_date(&self.now.timezone())
    }

    /// Number of done tasks whose completion falls on today.
    pub fn today_count(&self, tasks: &[Task]) -> usize {
        let today = self.today();
        tasks
            .iter()
            .filter(|task| task.is_done && self.completion_date(task) == today)
            .count()
    }

    /// Streak for every category that appears in `tasks`.
    ///
    /// A streak is only current if the category has a completion today; from
    /// there it extends backwards one day at a time until the first day
    /// without any completion. Several completions on one day count once.
    pub fn category_streaks(&self, tasks: &[Task]) -> BTreeMap<String, u32> {
        let mut days_by_category: BTreeMap<&str, BTreeSet<NaiveDate>> = BTreeMap::new();
        for task in tasks {
            let days = days_by_category.entry(task.category.as_str()).or_default();
            if task.is_done {
                days.insert(self.completion_date(task));
            }
        }

        let today = self.today();
        days_by_category
            .into_iter()
            .map(|(category, days)| (category.to_string(), run_ending_on(&days, today)))
            .collect()
    }

    /// Streak for a single category; 0 if it has no completions.
    pub fn category_streak(&self, tasks: &[Task], category: &str) -> u32 {
        let days: BTreeSet<NaiveDate> = tasks
            .iter()
            .filter(|task| task.is_done && task.category == category)
            .map(|task| self.completion_date(task))
            .collect();
        run_ending_on(&days, self.today())
    }

    /// Completion counts for Monday through Sunday of the current week.
    pub fn weekly_intensity(&self, tasks: &[Task]) -> [DayIntensity; 7] {
        let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
        for task in tasks.iter().filter(|task| task.is_done) {
            *per_day.entry(self.completion_date(task)).or_default() += 1;
        }

        let monday = self.week_start();
        std::array::from_fn(|offset| {
            let date = monday + Duration::days(offset as i64);
            DayIntensity {
                date,
                count: per_day.get(&date).copied().unwrap_or(0),
            }
        })
    }

    /// Compute every derived value from scratch.
    pub fn summarize(&self, tasks: &[Task]) -> StreakSummary {
        let summary = StreakSummary {
            today: self.today(),
            today_count: self.today_count(tasks),
            category_streaks: self.category_streaks(tasks),
            weekly: self.weekly_intensity(tasks),
        };
        tracing::debug!(
            tasks = tasks.len(),
            today = %summary.today,
            today_count = summary.today_count,
            categories = summary.category_streaks.len(),
            max_streak = summary.max_streak(),
            "aggregated task streaks"
        );
        summary
    }
}

/// Length of the run of consecutive days in `days` ending on `today`.
fn run_ending_on(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut expected = Some(today);
    while let Some(day) = expected.filter(|day| days.contains(day)) {
        streak += 1;
        expected = day.pred_opt();
    }
    streak
}
