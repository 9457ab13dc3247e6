//! Core error types for tasktally-core.
//!
//! Validation failures carry the stable error codes that hosts surface to
//! users (`MISSING_FIELDS`, `INVALID_TITLE`, ...). The aggregation engine in
//! [`crate::stats`] has no error type of its own: it cannot fail.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tasktally-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// No task with this id belongs to the store
    #[error("Task not found: {id}")]
    NotFound { id: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Validation(err) => err.code(),
            CoreError::NotFound { .. } => "TASK_NOT_FOUND",
            CoreError::Database(_) => "DATABASE_ERROR",
            CoreError::Config(_) => "CONFIG_ERROR",
            CoreError::Io(_) | CoreError::Json(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP-style status for hosts that expose the store over a network API.
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::Validation(_) => 400,
            CoreError::NotFound { .. } => 404,
            _ => 500,
        }
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors for task input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title and category are required")]
    MissingFields,

    #[error("{0}")]
    InvalidTitle(String),

    #[error("{0}")]
    InvalidDescription(String),

    #[error("{0}")]
    InvalidCategory(String),

    #[error("Invalid task ID")]
    InvalidId,

    #[error("Field '{0}' is not allowed to be updated")]
    InvalidField(String),
}

impl ValidationError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingFields => "MISSING_FIELDS",
            ValidationError::InvalidTitle(_) => "INVALID_TITLE",
            ValidationError::InvalidDescription(_) => "INVALID_DESCRIPTION",
            ValidationError::InvalidCategory(_) => "INVALID_CATEGORY",
            ValidationError::InvalidId => "INVALID_ID",
            ValidationError::InvalidField(_) => "INVALID_FIELD",
        }
    }
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg)
                if inner.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                DatabaseError::Locked
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_codes_are_stable() {
        assert_eq!(ValidationError::MissingFields.code(), "MISSING_FIELDS");
        assert_eq!(ValidationError::InvalidId.code(), "INVALID_ID");
        assert_eq!(
            ValidationError::InvalidField("userId".into()).to_string(),
            "Field 'userId' is not allowed to be updated"
        );
    }

    #[test]
    fn core_error_maps_status() {
        let not_found = CoreError::NotFound { id: "abc".into() };
        assert_eq!(not_found.code(), "TASK_NOT_FOUND");
        assert_eq!(not_found.status_code(), 404);

        let invalid: CoreError = ValidationError::InvalidTitle("Title cannot be empty".into()).into();
        assert_eq!(invalid.code(), "INVALID_TITLE");
        assert_eq!(invalid.status_code(), 400);
        assert_eq!(invalid.to_string(), "Title cannot be empty");

        let db: CoreError = DatabaseError::Locked.into();
        assert_eq!(db.status_code(), 500);
    }
}
