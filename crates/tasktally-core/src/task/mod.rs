//! Task record and input validation.
//!
//! A [`Task`] is the record the storage layer hands to the streak engine.
//! Creation goes through [`NewTask`] and mutation through [`TaskPatch`]; both
//! normalize and validate their fields before anything reaches the store.

pub mod quick_add;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

pub use quick_add::parse_quick_add;

pub const MAX_TITLE_LEN: usize = 120;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_CATEGORY_LEN: usize = 24;

/// Length of a task id in hex characters.
pub const TASK_ID_LEN: usize = 24;

/// Field names a [`TaskPatch`] may touch.
pub const UPDATABLE_FIELDS: [&str; 4] = ["title", "description", "category", "isDone"];

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub is_done: bool,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation, including toggling `is_done`.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Build a fresh, not-done task from validated input.
    pub fn new(input: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            id: generate_task_id(),
            title: input.title,
            description: input.description,
            category: input.category,
            is_done: false,
            created_at: now,
            updated_at: Some(now),
        }
    }

    /// The moment this task counts as completed.
    ///
    /// There is no dedicated completion timestamp: the last modification time
    /// stands in for it, falling back to creation time. Editing a done task
    /// therefore moves its completion forward.
    pub fn completion_time(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }

    /// Calendar day of [`Self::completion_time`] as seen in `tz`.
    pub fn completion_date<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.completion_time().with_timezone(tz).date_naive()
    }

    /// Apply a validated patch, stamping `updated_at` only when a field
    /// actually changed. Returns whether anything changed.
    ///
    /// A no-op patch must not move the completion day of a done task.
    pub fn apply(&mut self, patch: TaskPatch, now: DateTime<Utc>) -> bool {
        let mut changed = false;
        if let Some(title) = patch.title {
            changed |= replace_if_different(&mut self.title, title);
        }
        if let Some(description) = patch.description {
            changed |= replace_if_different(&mut self.description, description);
        }
        if let Some(category) = patch.category {
            changed |= replace_if_different(&mut self.category, category);
        }
        if let Some(is_done) = patch.is_done {
            changed |= replace_if_different(&mut self.is_done, is_done);
        }
        if changed {
            self.updated_at = Some(now);
        }
        changed
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
}

impl NewTask {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            category: category.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Trim and check every field, returning the normalized input.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() || self.category.trim().is_empty() {
            return Err(ValidationError::MissingFields);
        }
        check_title(title)?;
        let description = self.description.trim();
        check_description(description)?;
        let category = normalize_category(&self.category)?;

        Ok(Self {
            title: title.to_string(),
            description: description.to_string(),
            category,
        })
    }
}

/// Partial update of a task. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_done: Option<bool>,
}

impl TaskPatch {
    pub fn done(is_done: bool) -> Self {
        Self {
            is_done: Some(is_done),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.is_done.is_none()
    }

    /// Parse a patch from a JSON object, rejecting fields outside
    /// [`UPDATABLE_FIELDS`] with `INVALID_FIELD`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ValidationError> {
        let object = value
            .as_object()
            .ok_or_else(|| ValidationError::InvalidField("<root>".to_string()))?;
        if let Some(key) = object
            .keys()
            .find(|key| !UPDATABLE_FIELDS.contains(&key.as_str()))
        {
            return Err(ValidationError::InvalidField(key.clone()));
        }
        serde_json::from_value(value.clone())
            .map_err(|e| ValidationError::InvalidField(e.to_string()))
    }

    /// Trim and check every present field.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let title = match self.title {
            Some(title) => {
                let title = title.trim();
                if title.is_empty() {
                    return Err(ValidationError::InvalidTitle(
                        "Title cannot be empty".to_string(),
                    ));
                }
                check_title(title)?;
                Some(title.to_string())
            }
            None => None,
        };

        let description = match self.description {
            Some(description) => {
                let description = description.trim();
                check_description(description)?;
                Some(description.to_string())
            }
            None => None,
        };

        let category = self
            .category
            .as_deref()
            .map(normalize_category)
            .transpose()?;

        Ok(Self {
            title,
            description,
            category,
            is_done: self.is_done,
        })
    }
}

/// Trim and lowercase a category, then check length and alphabet.
pub fn normalize_category(raw: &str) -> Result<String, ValidationError> {
    let category = raw.trim().to_lowercase();
    if category.is_empty() {
        return Err(ValidationError::InvalidCategory(
            "Category cannot be empty".to_string(),
        ));
    }
    if category.chars().count() > MAX_CATEGORY_LEN {
        return Err(ValidationError::InvalidCategory(format!(
            "Category cannot exceed {MAX_CATEGORY_LEN} characters"
        )));
    }
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' ' || c == '-';
    if !category.chars().all(allowed) {
        return Err(ValidationError::InvalidCategory(
            "Category can only contain lowercase letters, numbers, spaces, and hyphens"
                .to_string(),
        ));
    }
    Ok(category)
}

/// Task ids are 24 hexadecimal characters.
pub fn validate_task_id(id: &str) -> Result<(), ValidationError> {
    if id.len() == TASK_ID_LEN && id.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidId)
    }
}

pub fn generate_task_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(TASK_ID_LEN);
    id
}

fn replace_if_different<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn check_title(title: &str) -> Result<(), ValidationError> {
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::InvalidTitle(format!(
            "Title cannot exceed {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn check_description(description: &str) -> Result<(), ValidationError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::InvalidDescription(format!(
            "Description cannot exceed {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}
