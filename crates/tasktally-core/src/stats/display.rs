//! Presentation helpers for streak summaries.

use serde::{Deserialize, Serialize};

use super::streaks::StreakSummary;

/// Heatmap bucket for a day's completion count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityLevel {
    None,
    Low,
    Medium,
    High,
    Max,
}

impl IntensityLevel {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => IntensityLevel::None,
            1 => IntensityLevel::Low,
            2 => IntensityLevel::Medium,
            3 => IntensityLevel::High,
            _ => IntensityLevel::Max,
        }
    }

    /// Numeric level 0-4.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get the character for ASCII heatmap visualization.
    pub fn heat_char(self) -> char {
        match self {
            IntensityLevel::None => '·',
            IntensityLevel::Low => '░',
            IntensityLevel::Medium => '▒',
            IntensityLevel::High => '▓',
            IntensityLevel::Max => '█',
        }
    }
}

/// How impressive a streak is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTier {
    Inactive,
    Started,
    Building,
    OnFire,
}

impl StreakTier {
    pub fn from_days(days: u32) -> Self {
        match days {
            0 => StreakTier::Inactive,
            1..=2 => StreakTier::Started,
            3..=6 => StreakTier::Building,
            _ => StreakTier::OnFire,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            StreakTier::Inactive => '-',
            StreakTier::Started => '*',
            StreakTier::Building => '+',
            StreakTier::OnFire => '!',
        }
    }
}

pub fn streak_message(category: &str, days: u32) -> String {
    match days {
        0 => format!("No recent activity in {category}"),
        1 => format!("Completed a task in {category} today!"),
        2..=6 => format!("{days} day streak in {category}!"),
        _ => format!("{days} day streak in {category}! Amazing!"),
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// Render the summary as a small plain-text widget.
pub fn render_text(summary: &StreakSummary, show_inactive: bool, show_heatmap: bool) -> String {
    let mut output = String::new();

    output.push_str("Streaks & Progress\n");
    output.push_str(&"=".repeat(40));
    output.push('\n');

    let filled = usize::from(summary.today_progress_percent()) / 10;
    output.push_str(&format!(
        "Today: {} [{}{}] {}%\n",
        plural(summary.today_count, "task"),
        "#".repeat(filled),
        " ".repeat(10 - filled),
        summary.today_progress_percent()
    ));
    if summary.today_count == 0 {
        output.push_str("Complete a task to start your streak!\n");
    }

    output.push('\n');
    let active = summary.active_streaks();
    if active.is_empty() {
        output.push_str("Complete tasks to build your streaks!\n");
    } else {
        output.push_str("Category streaks:\n");
        for (category, days) in &active {
            output.push_str(&format!(
                "  {} {:<24} {:>3} day{}  {}\n",
                StreakTier::from_days(*days).glyph(),
                category,
                days,
                if *days == 1 { "" } else { "s" },
                streak_message(category, *days)
            ));
        }
    }

    if show_inactive {
        let inactive: Vec<&str> = summary
            .category_streaks
            .iter()
            .filter(|(_, days)| **days == 0)
            .map(|(category, _)| category.as_str())
            .collect();
        if !inactive.is_empty() {
            output.push_str(&format!("Inactive: {}\n", inactive.join(", ")));
        }
    }

    if show_heatmap {
        output.push_str("\nThis week:\n");
        for day in &summary.weekly {
            output.push_str(&format!("{:<4}", day.date.format("%a").to_string()));
        }
        output.push('\n');
        for day in &summary.weekly {
            output.push_str(&format!("{:<4}", day.level().heat_char()));
        }
        output.push('\n');
        output.push_str(&format!("{} this week\n", plural(summary.week_total(), "completion")));
    }

    output
}
