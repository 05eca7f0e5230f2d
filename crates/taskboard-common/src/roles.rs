//! Role registry: the closed set of application and project roles.
//!
//! Application roles and project roles are separate types on purpose: a
//! project role can never be ranked against an application role. The only
//! place both meet is [`Role`], which exists for parsing and display at the
//! input boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TaskboardError;

/// Application-wide role, held by every user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationRole {
    #[serde(rename = "app-admin")]
    Admin,
    #[serde(rename = "app-manager")]
    Manager,
    #[serde(rename = "app-user")]
    User,
}

/// Per-project role, granted directly to a user or through a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectRole {
    #[serde(rename = "project-manager")]
    ProjectManager,
    #[serde(rename = "project-member")]
    ProjectMember,
    #[serde(rename = "project-viewer")]
    ProjectViewer,
}

impl ApplicationRole {
    pub const ALL: [ApplicationRole; 3] = [Self::Admin, Self::Manager, Self::User];

    /// Relative privilege, higher is more privileged.
    pub fn rank(self) -> i32 {
        match self {
            Self::Admin => 3,
            Self::Manager => 2,
            Self::User => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "app-admin",
            Self::Manager => "app-manager",
            Self::User => "app-user",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Human label for role pickers.
    pub fn label(self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Manager => "Manager",
            Self::User => "User",
        }
    }
}

impl ProjectRole {
    pub const ALL: [ProjectRole; 3] = [
        Self::ProjectManager,
        Self::ProjectMember,
        Self::ProjectViewer,
    ];

    /// Relative privilege, higher is more privileged.
    pub fn rank(self) -> i32 {
        match self {
            Self::ProjectManager => 3,
            Self::ProjectMember => 2,
            Self::ProjectViewer => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProjectManager => "project-manager",
            Self::ProjectMember => "project-member",
            Self::ProjectViewer => "project-viewer",
        }
    }

    /// Human label for role pickers.
    pub fn label(self) -> &'static str {
        match self {
            Self::ProjectManager => "Project Manager",
            Self::ProjectMember => "Project Member",
            Self::ProjectViewer => "Project Viewer",
        }
    }

    /// Managers and members can be assigned tasks; viewers are read-only.
    pub fn is_assignable(self) -> bool {
        !matches!(self, Self::ProjectViewer)
    }

    /// Managers and members can change tasks.
    pub fn can_edit(self) -> bool {
        self.rank() >= Self::ProjectMember.rank()
    }

    pub fn can_manage(self) -> bool {
        self == Self::ProjectManager
    }

    /// The higher-ranked of two roles.
    pub fn max(self, other: ProjectRole) -> ProjectRole {
        if other.rank() > self.rank() { other } else { self }
    }

    /// Highest-ranked role in `roles`, or `None` when empty.
    pub fn highest(roles: impl IntoIterator<Item = ProjectRole>) -> Option<ProjectRole> {
        roles.into_iter().reduce(ProjectRole::max)
    }
}

impl fmt::Display for ApplicationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationRole {
    type Err = TaskboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Role::from_str(s)? {
            Role::Application(role) => Ok(role),
            Role::Project(_) => Err(TaskboardError::InvalidRole { value: s.to_string() }),
        }
    }
}

impl FromStr for ProjectRole {
    type Err = TaskboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Role::from_str(s)? {
            Role::Project(role) => Ok(role),
            Role::Application(_) => Err(TaskboardError::InvalidRole { value: s.to_string() }),
        }
    }
}

/// A role of either scope, as received from user input or storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Application(ApplicationRole),
    Project(ProjectRole),
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Application(role) => role.as_str(),
            Self::Project(role) => role.as_str(),
        }
    }

    /// Rank within the role's own scope.
    pub fn rank(self) -> i32 {
        match self {
            Self::Application(role) => role.rank(),
            Self::Project(role) => role.rank(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TaskboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let role = match s {
            "app-admin" => Role::Application(ApplicationRole::Admin),
            "app-manager" => Role::Application(ApplicationRole::Manager),
            "app-user" => Role::Application(ApplicationRole::User),
            "project-manager" => Role::Project(ProjectRole::ProjectManager),
            "project-member" => Role::Project(ProjectRole::ProjectMember),
            "project-viewer" => Role::Project(ProjectRole::ProjectViewer),
            other => {
                return Err(TaskboardError::InvalidRole {
                    value: other.to_string(),
                });
            }
        };
        Ok(role)
    }
}

pub fn is_project_role(role: &Role) -> bool {
    matches!(role, Role::Project(_))
}

pub fn is_application_role(role: &Role) -> bool {
    matches!(role, Role::Application(_))
}

/// Rank of a stored role constant.
///
/// # Panics
/// Panics when `value` is outside the closed role set. Values must be
/// validated where they enter the system, so reaching this with an unknown
/// constant is a defect.
pub fn rank_of(value: &str) -> i32 {
    match Role::from_str(value) {
        Ok(role) => role.rank(),
        Err(_) => panic!("unknown role constant: {value:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_rank_order() {
        assert!(ProjectRole::ProjectManager.rank() > ProjectRole::ProjectMember.rank());
        assert!(ProjectRole::ProjectMember.rank() > ProjectRole::ProjectViewer.rank());
        assert!(ApplicationRole::Admin.rank() > ApplicationRole::Manager.rank());
        assert!(ApplicationRole::Manager.rank() > ApplicationRole::User.rank());
    }

    #[test]
    fn test_highest() {
        let roles = [
            ProjectRole::ProjectViewer,
            ProjectRole::ProjectManager,
            ProjectRole::ProjectMember,
        ];
        assert_eq!(ProjectRole::highest(roles), Some(ProjectRole::ProjectManager));
        assert_eq!(ProjectRole::highest([]), None);
    }

    #[test]
    fn test_capabilities() {
        assert!(ProjectRole::ProjectMember.can_edit());
        assert!(!ProjectRole::ProjectViewer.can_edit());
        assert!(ProjectRole::ProjectManager.can_manage());
        assert!(!ProjectRole::ProjectMember.can_manage());
    }

    #[test]
    fn test_parse_round_trip_and_scopes() {
        for role in ProjectRole::ALL {
            let parsed: Role = role.as_str().parse().unwrap();
            assert!(is_project_role(&parsed));
            assert!(!is_application_role(&parsed));
        }
        let admin: Role = "app-admin".parse().unwrap();
        assert!(is_application_role(&admin));
        assert_eq!(admin, Role::Application(ApplicationRole::Admin));
    }

    #[test]
    fn test_parse_rejects_wrong_scope_and_unknown() {
        assert!("app-admin".parse::<ProjectRole>().is_err());
        assert!("project-member".parse::<ApplicationRole>().is_err());
        let err = "root".parse::<Role>().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ROLE");
    }

    #[test]
    fn test_rank_of_known() {
        assert_eq!(rank_of("project-viewer"), 1);
        assert_eq!(rank_of("app-admin"), 3);
    }

    #[test]
    #[should_panic(expected = "unknown role constant")]
    fn test_rank_of_unknown_panics() {
        rank_of("superuser");
    }

    #[test]
    fn test_serde_uses_role_constants() {
        let json = serde_json::to_string(&ProjectRole::ProjectMember).unwrap();
        assert_eq!(json, "\"project-member\"");
        let role: ApplicationRole = serde_json::from_str("\"app-manager\"").unwrap();
        assert_eq!(role, ApplicationRole::Manager);
    }
}
