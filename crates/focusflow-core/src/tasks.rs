//! Short to-do list shown next to the timer.
//!
//! Validation lives here; persistence is in
//! [`Database`](crate::storage::Database).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// The list is meant for the next few sessions, not as a backlog.
pub const MAX_TASKS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub is_done: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            is_done: false,
            created_at: Utc::now(),
        }
    }
}

/// Check a candidate title against the current list.
///
/// Returns the trimmed title. Rejects blank titles, a full list, and titles
/// that already exist ignoring case.
pub fn validate_new_title(existing: &[Task], title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty {
            field: "title".into(),
        });
    }
    if existing.len() >= MAX_TASKS {
        return Err(ValidationError::Full {
            collection: "task list".into(),
            max: MAX_TASKS,
        });
    }
    let lowered = trimmed.to_lowercase();
    if existing.iter().any(|t| t.title.to_lowercase() == lowered) {
        return Err(ValidationError::Duplicate {
            value: trimmed.to_string(),
        });
    }
    Ok(trimmed.to_string())
}
