mod config;
pub mod migrations;
pub mod task_db;

pub use config::{Config, DisplayConfig, FocusConfig, LoggingConfig, TasksConfig};
pub use task_db::{CategoryCount, TaskDb, DEFAULT_FETCH_LIMIT};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory, creating it if needed.
///
/// `TASKTALLY_HOME` overrides the location outright. Otherwise this is
/// `~/.config/tasktally[-dev]/`, with the `-dev` suffix when
/// `TASKTALLY_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("TASKTALLY_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("TASKTALLY_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("tasktally-dev")
            } else {
                base_dir.join("tasktally")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
