//! Streak and heatmap commands for CLI.

use clap::Subcommand;
use serde::Serialize;
use tasktally_core::{
    render_text, streak_message, Config, Result, StreakAggregator, StreakSummary, StreakTier,
    TaskDb,
};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Full streak widget: today, category streaks and the week
    Summary {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Number of tasks completed today
    Today,
    /// Per-category streaks
    Streaks {
        /// Include categories with no current streak
        #[arg(long)]
        all: bool,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Monday-Sunday completion counts for this week
    Week {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct StreakRow<'a> {
    category: &'a str,
    days: u32,
    tier: StreakTier,
    message: String,
}

fn streak_rows(summary: &StreakSummary, all: bool) -> Vec<StreakRow<'_>> {
    let entries: Vec<(&str, u32)> = if all {
        let mut entries: Vec<_> = summary
            .category_streaks
            .iter()
            .map(|(category, days)| (category.as_str(), *days))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    } else {
        summary.active_streaks()
    };

    entries
        .into_iter()
        .map(|(category, days)| StreakRow {
            category,
            days,
            tier: StreakTier::from_days(days),
            message: streak_message(category, days),
        })
        .collect()
}

pub fn run(action: StatsAction) -> Result<()> {
    let config = Config::load()?;
    let db = TaskDb::open()?;
    let tasks = db.list_tasks(None, config.tasks.fetch_limit)?;
    let summary = StreakAggregator::local().summarize(&tasks);

    match action {
        StatsAction::Summary { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!(
                    "{}",
                    render_text(
                        &summary,
                        config.display.show_inactive,
                        config.display.show_heatmap
                    )
                );
            }
        }
        StatsAction::Today => {
            println!("{}", summary.today_count);
        }
        StatsAction::Streaks { all, json } => {
            let rows = streak_rows(&summary, all);
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                println!("Complete tasks to build your streaks!");
            } else {
                for row in &rows {
                    println!("{:<24} {:>3}  {}", row.category, row.days, row.message);
                }
            }
        }
        StatsAction::Week { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&summary.weekly)?);
            } else {
                for day in &summary.weekly {
                    println!(
                        "{} {} {:>3}{}",
                        day.date.format("%a %Y-%m-%d"),
                        day.level().heat_char(),
                        day.count,
                        if day.date == summary.today { "  <- today" } else { "" }
                    );
                }
            }
        }
    }
    Ok(())
}
