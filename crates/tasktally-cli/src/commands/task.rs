//! Task management commands for CLI.

use clap::Subcommand;
use tasktally_core::{
    parse_quick_add, Config, CoreError, Result, Task, TaskDb, TaskPatch, ValidationError,
};

use super::focus::{self, FocusCommand};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task; a trailing `#tag` sets its category
    Add {
        /// Task text, e.g. "Buy milk #personal"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Task description
        #[arg(long)]
        description: Option<String>,
        /// Category, overriding any `#tag` in the text
        #[arg(long)]
        category: Option<String>,
    },
    /// List open tasks, newest first
    List {
        /// Filter by category
        #[arg(long)]
        category: Option<String>,
        /// Include completed tasks
        #[arg(long)]
        show_done: bool,
        /// Maximum number of tasks (default: tasks.fetch_limit)
        #[arg(long)]
        limit: Option<usize>,
        /// Print JSON instead of one line per task
        #[arg(long)]
        json: bool,
    },
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Update a task
    Update {
        /// Task ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New category
        #[arg(long)]
        category: Option<String>,
        /// Set completed status
        #[arg(long)]
        done: Option<bool>,
        /// JSON object of fields to change, e.g. '{"isDone": true}'
        #[arg(long, conflicts_with_all = ["title", "description", "category", "done"])]
        patch: Option<String>,
    },
    /// Mark a task as done
    Done {
        /// Task ID
        id: String,
    },
    /// Mark a task as not done
    Undo {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
    /// Run a focus session on a task
    Focus {
        /// Task ID
        id: String,
        /// What to do with the session
        #[arg(value_enum, default_value_t = FocusCommand::Status)]
        action: FocusCommand,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// List categories with their task counts
    Categories {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

fn format_line(task: &Task) -> String {
    format!(
        "[{}] {}  {:<12} {}",
        if task.is_done { 'x' } else { ' ' },
        task.id,
        task.category,
        task.title
    )
}

pub fn run(action: TaskAction) -> Result<()> {
    let db = TaskDb::open()?;

    match action {
        TaskAction::Add {
            text,
            description,
            category,
        } => {
            let fallback = match db.last_used_category()? {
                Some(last) => last,
                None => Config::load()?.tasks.default_category,
            };
            let mut input =
                parse_quick_add(&text.join(" "), &fallback).ok_or(ValidationError::MissingFields)?;
            if let Some(category) = category {
                input.category = category;
            }
            if let Some(description) = description {
                input = input.with_description(description);
            }

            let task = db.create_task(input)?;
            db.set_last_used_category(&task.category)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List {
            category,
            show_done,
            limit,
            json,
        } => {
            let limit = match limit {
                Some(limit) => limit,
                None => Config::load()?.tasks.fetch_limit,
            };
            let tasks = db.list_tasks(category.as_deref(), limit)?;
            let completed = tasks.iter().filter(|task| task.is_done).count();
            let visible: Vec<&Task> = tasks
                .iter()
                .filter(|task| show_done || !task.is_done)
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else if tasks.is_empty() {
                println!("No tasks yet.");
            } else {
                for task in &visible {
                    println!("{}", format_line(task));
                }
                println!(
                    "{completed} completed, {} remaining",
                    tasks.len() - completed
                );
            }
        }
        TaskAction::Get { id } => {
            let task = db.get_task(&id)?.ok_or(CoreError::NotFound { id })?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Update {
            id,
            title,
            description,
            category,
            done,
            patch,
        } => {
            let patch = match patch {
                Some(raw) => {
                    let value: serde_json::Value = serde_json::from_str(&raw)
                        .map_err(|e| ValidationError::InvalidField(format!("<patch>: {e}")))?;
                    TaskPatch::from_json(&value)?
                }
                None => TaskPatch {
                    title,
                    description,
                    category,
                    is_done: done,
                },
            };
            let task = db.update_task(&id, patch)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Done { id } => {
            let task = db.update_task(&id, TaskPatch::done(true))?;
            println!("{}", format_line(&task));
        }
        TaskAction::Undo { id } => {
            let task = db.update_task(&id, TaskPatch::done(false))?;
            println!("{}", format_line(&task));
        }
        TaskAction::Delete { id } => {
            db.delete_task(&id)?;
            println!("Task deleted: {id}");
        }
        TaskAction::Focus { id, action, json } => {
            focus::run(&db, &id, action, json)?;
        }
        TaskAction::Categories { json } => {
            let counts = db.category_counts()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else {
                for entry in &counts {
                    println!("{:>4}  {}", entry.count, entry.category);
                }
            }
        }
    }
    Ok(())
}
