//! Project permission bits derived from a project role.
//!
//! Roles are ranked, but controllers ask about actions. Each project role
//! maps to a fixed permission set; application admins get everything.

use bitflags::bitflags;

use crate::roles::{ApplicationRole, ProjectRole};

bitflags! {
    /// Actions a user may perform inside a project.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ProjectPermissions: u32 {
        // === Read ===
        /// View the board, task details and activity
        const VIEW_BOARD        = 1 << 0;
        /// Search and export task listings
        const SEARCH_TASKS      = 1 << 1;

        // === Write ===
        /// Create tasks
        const CREATE_TASKS      = 1 << 2;
        /// Edit, move and close tasks
        const EDIT_TASKS        = 1 << 3;
        /// Be selected as a task assignee
        const BE_ASSIGNED       = 1 << 4;
        /// Comment on tasks
        const COMMENT           = 1 << 5;

        // === Manage ===
        /// Edit columns, swimlanes and categories
        const MANAGE_BOARD      = 1 << 6;
        /// Add, remove and change roles of project users and groups
        const MANAGE_MEMBERS    = 1 << 7;
        /// Edit project settings, enable the public board
        const MANAGE_PROJECT    = 1 << 8;
    }
}

impl ProjectPermissions {
    /// Permission set granted by a project role.
    pub fn for_role(role: ProjectRole) -> Self {
        let read = Self::VIEW_BOARD | Self::SEARCH_TASKS;
        let write = Self::CREATE_TASKS | Self::EDIT_TASKS | Self::BE_ASSIGNED | Self::COMMENT;

        match role {
            ProjectRole::ProjectViewer => read,
            ProjectRole::ProjectMember => read | write,
            ProjectRole::ProjectManager => Self::all(),
        }
    }

    /// Check if a user with these permissions can perform an action.
    pub fn has(&self, required: ProjectPermissions) -> bool {
        self.contains(required)
    }
}

/// Compute effective project permissions.
///
/// Application admins bypass project roles entirely. Everyone else gets the
/// permissions of their effective project role, or nothing.
pub fn compute_permissions(
    application_role: ApplicationRole,
    project_role: Option<ProjectRole>,
) -> ProjectPermissions {
    if application_role.is_admin() {
        return ProjectPermissions::all();
    }

    project_role
        .map(ProjectPermissions::for_role)
        .unwrap_or_else(ProjectPermissions::empty)
}
