//! Task model: one card on the board.
//!
//! Dates are unix timestamps in seconds; `0` means "not set". Task rows are
//! also handled untyped (see `taskboard_db::Row`) once they pass through the
//! query builder, so field names here double as column names of `tasks`.

use serde::{Deserialize, Serialize};

/// Task status stored in `tasks.is_active`.
pub mod status {
    pub const OPEN: i64 = 1;
    pub const CLOSED: i64 = 0;
}

/// A task on a project board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    pub column_id: i64,

    /// `0` is the default swimlane
    #[serde(default)]
    pub swimlane_id: i64,

    /// Assignee, `0` when unassigned
    #[serde(default)]
    pub owner_id: i64,

    #[serde(default)]
    pub creator_id: i64,

    /// `0` when uncategorized
    #[serde(default)]
    pub category_id: i64,

    pub color_id: String,
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// External reference (ticket number, commit hash)
    #[serde(default)]
    pub reference: String,

    /// [`status::OPEN`] or [`status::CLOSED`]
    pub is_active: i64,

    /// Order inside its column/swimlane cell
    pub position: i64,

    /// Complexity / story points
    #[serde(default)]
    pub score: i64,

    #[serde(default)]
    pub date_due: i64,
    #[serde(default)]
    pub date_started: i64,
    #[serde(default)]
    pub date_creation: i64,
    #[serde(default)]
    pub date_modification: i64,
    #[serde(default)]
    pub date_completed: i64,
}

impl Task {
    /// An open, unassigned task in the default swimlane.
    pub fn new(id: i64, project_id: i64, column_id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            project_id,
            column_id,
            swimlane_id: 0,
            owner_id: 0,
            creator_id: 0,
            category_id: 0,
            color_id: "yellow".to_string(),
            title: title.into(),
            description: String::new(),
            reference: String::new(),
            is_active: status::OPEN,
            position: 1,
            score: 0,
            date_due: 0,
            date_started: 0,
            date_creation: 0,
            date_modification: 0,
            date_completed: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_active == status::OPEN
    }

    pub fn is_assigned(&self) -> bool {
        self.owner_id != 0
    }
}
