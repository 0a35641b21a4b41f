//! Core types for the task service.

use serde::{Deserialize, Serialize};

/// Status assigned to new tasks when the request supplies none.
pub const STATUS_DEFAULT: &str = "Incomplete";

/// A single task record, exactly as persisted and served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub status: String,
}

/// Validated field set for a task write (create or full update).
///
/// Constructed only after validation, so every field is known non-empty
/// by the time it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub status: String,
}
