//! Board layout: columns and swimlanes of a project.

use serde::{Deserialize, Serialize};

/// A board column (workflow step).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: i64,
    pub project_id: i64,
    pub title: String,

    /// Left-to-right order on the board
    pub position: i64,

    /// WIP limit, `0` means unlimited
    #[serde(default)]
    pub task_limit: u32,

    #[serde(default)]
    pub description: String,
}

impl Column {
    pub fn new(id: i64, project_id: i64, title: impl Into<String>, position: i64) -> Self {
        Self {
            id,
            project_id,
            title: title.into(),
            position,
            task_limit: 0,
            description: String::new(),
        }
    }
}

/// A horizontal lane across all columns. Id `0` is the default swimlane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swimlane {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub position: i64,
    pub is_active: bool,
}

impl Swimlane {
    pub const DEFAULT_ID: i64 = 0;

    pub fn new(id: i64, project_id: i64, name: impl Into<String>, position: i64) -> Self {
        Self {
            id,
            project_id,
            name: name.into(),
            position,
            is_active: true,
        }
    }
}

/// A task category, scoped to one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
}
