//! Project model and the role assignments a project owns.
//!
//! Role assignments are unique per `(project_id, user_id)` and
//! `(project_id, group_id)` and are removed together with their project.

use serde::{Deserialize, Serialize};

use crate::roles::ProjectRole;

/// A project (one board).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,

    /// Inactive projects are hidden from listings
    pub is_active: bool,

    /// Every enabled user is implicitly a project member
    pub is_everybody_allowed: bool,

    /// The read-only board is reachable through `token`
    #[serde(default)]
    pub is_public: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Label of swimlane `0`
    #[serde(default = "default_swimlane_name")]
    pub default_swimlane: String,
}

fn default_swimlane_name() -> String {
    "Default swimlane".to_string()
}

impl Project {
    /// Create an active, private project.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_active: true,
            is_everybody_allowed: false,
            is_public: false,
            token: None,
            default_swimlane: default_swimlane_name(),
        }
    }

    pub fn everybody_allowed(mut self) -> Self {
        self.is_everybody_allowed = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn status(&self) -> ProjectStatus {
        if self.is_active {
            ProjectStatus::Active
        } else {
            ProjectStatus::Inactive
        }
    }
}

/// Project lifecycle state used to filter listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Inactive,
}

/// Role granted directly to a user on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectUserRole {
    pub project_id: i64,
    pub user_id: i64,
    pub role: ProjectRole,
}

/// Role granted to every member of a group on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectGroupRole {
    pub project_id: i64,
    pub group_id: i64,
    pub role: ProjectRole,
}
