//! Project permission model.
//!
//! A user's effective role on a project is the highest-ranked role among
//! their direct assignment and every assignment of a group they belong to.
//! Everybody-allowed projects grant `project-member` to active users that
//! hold no explicit role. Application admins may access every project.
//!
//! Lookups against a missing project or user answer `None`, `false` or an
//! empty list. Only [`PermissionModel::require_permission`] returns errors.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use taskboard_common::error::{TaskboardError, TaskboardResult};
use taskboard_common::models::{Project, ProjectGroupRole, ProjectStatus, ProjectUserRole, User};
use taskboard_common::permissions::{compute_permissions, ProjectPermissions};
use taskboard_common::roles::ProjectRole;
use tracing::debug;

/// Read access to users, groups, projects and role assignments.
pub trait AccessDirectory {
    fn project(&self, project_id: i64) -> Option<&Project>;

    fn projects(&self) -> Vec<&Project>;

    fn user(&self, user_id: i64) -> Option<&User>;

    fn users(&self) -> Vec<&User>;

    /// Direct assignments on a project.
    fn user_roles(&self, project_id: i64) -> Vec<ProjectUserRole>;

    /// Group assignments on a project.
    fn group_roles(&self, project_id: i64) -> Vec<ProjectGroupRole>;

    /// Every direct assignment held by a user, across projects.
    fn roles_of_user(&self, user_id: i64) -> Vec<ProjectUserRole>;

    fn groups_of_user(&self, user_id: i64) -> Vec<i64>;

    fn members_of_group(&self, group_id: i64) -> Vec<i64>;
}

/// Options of [`PermissionModel::get_assignable_users_list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignableListOptions {
    /// Prepend `(0, "Unassigned")`
    pub unassigned: bool,
    /// Prepend `(-1, "Everybody")`
    pub everybody: bool,
    /// Return the lone assignable user without the extra entries
    pub single_user: bool,
}

impl Default for AssignableListOptions {
    fn default() -> Self {
        Self {
            unassigned: true,
            everybody: false,
            single_user: false,
        }
    }
}

pub const UNASSIGNED_ID: i64 = 0;
pub const EVERYBODY_ID: i64 = -1;

/// A user explicitly assigned to a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectUser {
    pub user_id: i64,
    pub display_name: String,
    pub role: ProjectRole,
}

/// Permission checks over an [`AccessDirectory`].
///
/// Role lookups are memoized for the lifetime of the model, which is meant
/// to be one request.
pub struct PermissionModel<'a, D: AccessDirectory + ?Sized> {
    directory: &'a D,
    now: DateTime<Utc>,
    roles: RefCell<HashMap<(i64, i64), Option<ProjectRole>>>,
}

impl<'a, D: AccessDirectory + ?Sized> PermissionModel<'a, D> {
    pub fn new(directory: &'a D) -> Self {
        Self::at(directory, Utc::now())
    }

    /// Model evaluating account locks at `now`.
    pub fn at(directory: &'a D, now: DateTime<Utc>) -> Self {
        Self {
            directory,
            now,
            roles: RefCell::new(HashMap::new()),
        }
    }

    fn enabled(&self, user: &User) -> bool {
        user.is_enabled_at(self.now)
    }

    /// Highest role from the direct assignment and the user's groups.
    pub fn get_user_role(&self, project_id: i64, user_id: i64) -> Option<ProjectRole> {
        if let Some(role) = self.roles.borrow().get(&(project_id, user_id)) {
            return *role;
        }

        let direct = self
            .directory
            .user_roles(project_id)
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.role);

        let groups = self.directory.groups_of_user(user_id);
        let inherited = self
            .directory
            .group_roles(project_id)
            .into_iter()
            .filter(|r| groups.contains(&r.group_id))
            .map(|r| r.role);

        let role = ProjectRole::highest(direct.chain(inherited));
        self.roles.borrow_mut().insert((project_id, user_id), role);
        role
    }

    /// Explicit role, else `project-member` on everybody-allowed projects.
    pub fn effective_role(&self, project_id: i64, user_id: i64) -> Option<ProjectRole> {
        if let Some(role) = self.get_user_role(project_id, user_id) {
            return Some(role);
        }
        let project = self.directory.project(project_id)?;
        let user = self.directory.user(user_id)?;
        (project.is_everybody_allowed && user.is_active).then_some(ProjectRole::ProjectMember)
    }

    pub fn is_member(&self, project_id: i64, user_id: i64) -> bool {
        self.effective_role(project_id, user_id).is_some()
    }

    /// Enabled member whose role may own tasks.
    pub fn is_assignable(&self, project_id: i64, user_id: i64) -> bool {
        let Some(user) = self.directory.user(user_id) else {
            return false;
        };
        self.enabled(user)
            && self
                .effective_role(project_id, user_id)
                .is_some_and(ProjectRole::is_assignable)
    }

    pub fn is_manager(&self, project_id: i64, user_id: i64) -> bool {
        self.effective_role(project_id, user_id) == Some(ProjectRole::ProjectManager)
    }

    /// Admins see every project, other users their memberships.
    pub fn can_access(&self, project_id: i64, user_id: i64) -> bool {
        let Some(user) = self.directory.user(user_id) else {
            return false;
        };
        if self.directory.project(project_id).is_none() {
            return false;
        }
        let allowed = user.is_admin() || self.is_member(project_id, user_id);
        if !allowed {
            debug!(project_id, user_id, "project access denied");
        }
        allowed
    }

    pub fn has_permission(&self, project_id: i64, user_id: i64, required: ProjectPermissions) -> bool {
        let Some(user) = self.directory.user(user_id) else {
            return false;
        };
        if self.directory.project(project_id).is_none() || !self.enabled(user) {
            return false;
        }
        let granted = compute_permissions(user.role, self.effective_role(project_id, user_id));
        let allowed = granted.has(required);
        if !allowed {
            debug!(project_id, user_id, ?required, "project permission denied");
        }
        allowed
    }

    /// [`has_permission`](Self::has_permission) for callers that propagate
    /// errors.
    pub fn require_permission(
        &self,
        project_id: i64,
        user_id: i64,
        required: ProjectPermissions,
    ) -> TaskboardResult<()> {
        if self.directory.project(project_id).is_none() {
            return Err(TaskboardError::not_found("Project"));
        }
        if !self.has_permission(project_id, user_id, required) {
            return Err(TaskboardError::Forbidden);
        }
        Ok(())
    }

    /// Users explicitly or group-assigned to the project.
    fn explicit_user_ids(&self, project_id: i64) -> BTreeSet<i64> {
        let mut ids: BTreeSet<i64> = self
            .directory
            .user_roles(project_id)
            .iter()
            .map(|r| r.user_id)
            .collect();
        for role in self.directory.group_roles(project_id) {
            ids.extend(self.directory.members_of_group(role.group_id));
        }
        ids
    }

    fn sorted_users<'u>(&self, users: impl IntoIterator<Item = &'u User>) -> Vec<(i64, String)> {
        let mut users: Vec<&User> = users.into_iter().collect();
        users.sort_by(|a, b| {
            a.display_name()
                .to_lowercase()
                .cmp(&b.display_name().to_lowercase())
                .then_with(|| a.username.cmp(&b.username))
        });
        users
            .into_iter()
            .map(|u| (u.id, u.display_name().to_string()))
            .collect()
    }

    /// Enabled users who may own tasks of the project, by display name.
    pub fn get_assignable_users(&self, project_id: i64) -> Vec<(i64, String)> {
        let Some(project) = self.directory.project(project_id) else {
            return Vec::new();
        };

        let mut candidates = self.explicit_user_ids(project_id);
        if project.is_everybody_allowed {
            candidates.extend(self.directory.users().iter().map(|u| u.id));
        }

        let users = candidates
            .into_iter()
            .filter(|id| self.is_assignable(project_id, *id))
            .filter_map(|id| self.directory.user(id));
        self.sorted_users(users)
    }

    /// Assignable users for a picker, optionally led by the special entries.
    pub fn get_assignable_users_list(
        &self,
        project_id: i64,
        options: AssignableListOptions,
    ) -> Vec<(i64, String)> {
        let users = self.get_assignable_users(project_id);
        if options.single_user && users.len() == 1 {
            return users;
        }

        let mut list = Vec::with_capacity(users.len() + 2);
        if options.everybody {
            list.push((EVERYBODY_ID, "Everybody".to_string()));
        }
        if options.unassigned {
            list.push((UNASSIGNED_ID, "Unassigned".to_string()));
        }
        list.extend(users);
        list
    }

    /// Direct assignments of the project with display names.
    pub fn get_users(&self, project_id: i64) -> Vec<ProjectUser> {
        let roles = self.directory.user_roles(project_id);
        let users = roles
            .iter()
            .filter_map(|r| self.directory.user(r.user_id));
        self.sorted_users(users)
            .into_iter()
            .filter_map(|(user_id, display_name)| {
                let role = roles.iter().find(|r| r.user_id == user_id)?.role;
                Some(ProjectUser {
                    user_id,
                    display_name,
                    role,
                })
            })
            .collect()
    }

    /// Direct and group-derived members bucketed by their role, highest
    /// role first. Empty buckets are omitted.
    pub fn users_grouped_by_role(&self, project_id: i64) -> Vec<(ProjectRole, Vec<(i64, String)>)> {
        let ids = self.explicit_user_ids(project_id);
        ProjectRole::ALL
            .into_iter()
            .filter_map(|role| {
                let users = ids
                    .iter()
                    .filter(|id| self.get_user_role(project_id, **id) == Some(role))
                    .filter_map(|id| self.directory.user(*id));
                let users = self.sorted_users(users);
                (!users.is_empty()).then_some((role, users))
            })
            .collect()
    }

    /// Projects the user is explicitly assigned to, directly or through a
    /// group, by name. An empty `statuses` slice keeps every project.
    pub fn get_projects_by_user(&self, user_id: i64, statuses: &[ProjectStatus]) -> Vec<(i64, String)> {
        let mut ids: BTreeSet<i64> = self
            .directory
            .roles_of_user(user_id)
            .iter()
            .map(|r| r.project_id)
            .collect();

        let groups = self.directory.groups_of_user(user_id);
        for project in self.directory.projects() {
            if self
                .directory
                .group_roles(project.id)
                .iter()
                .any(|r| groups.contains(&r.group_id))
            {
                ids.insert(project.id);
            }
        }

        let mut projects: Vec<&Project> = ids
            .into_iter()
            .filter_map(|id| self.directory.project(id))
            .filter(|p| statuses.is_empty() || statuses.contains(&p.status()))
            .collect();
        projects.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        projects.into_iter().map(|p| (p.id, p.name.clone())).collect()
    }

    /// Active projects the user is a member of, everybody-allowed included.
    pub fn get_active_project_ids(&self, user_id: i64) -> BTreeSet<i64> {
        self.directory
            .projects()
            .into_iter()
            .filter(|p| p.is_active && self.is_member(p.id, user_id))
            .map(|p| p.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::AccessSnapshot;
    use chrono::Duration;
    use taskboard_common::models::Group;
    use taskboard_common::roles::ApplicationRole;

    // Users: 1 admin, 2 alice, 3 bob, 4 carol (disabled), 5 dave (locked)
    // Projects: 1 private, 2 everybody-allowed, 3 inactive
    // Groups: 10 {bob, carol}, 11 {bob}
    fn snapshot() -> AccessSnapshot {
        let mut snapshot = AccessSnapshot::default();
        snapshot.insert_user(User::new(1, "admin").with_role(ApplicationRole::Admin));
        snapshot.insert_user(User::new(2, "alice").with_name("Alice"));
        snapshot.insert_user(User::new(3, "bob").with_name("alice"));
        let mut carol = User::new(4, "carol");
        carol.is_active = false;
        snapshot.insert_user(carol);
        let mut dave = User::new(5, "dave");
        dave.locked_until = Some(Utc::now() + Duration::hours(1));
        snapshot.insert_user(dave);

        snapshot.insert_project(Project::new(1, "Private"));
        snapshot.insert_project(Project::new(2, "Open").everybody_allowed());
        snapshot.insert_project(Project::new(3, "Archive").inactive());

        snapshot.insert_group(Group { id: 10, name: "Dev".into(), external_id: None });
        snapshot.insert_group(Group { id: 11, name: "Leads".into(), external_id: None });
        assert!(snapshot.add_group_member(10, 3));
        assert!(snapshot.add_group_member(10, 4));
        assert!(snapshot.add_group_member(11, 3));

        assert!(snapshot.add_user(1, 2, ProjectRole::ProjectMember));
        assert!(snapshot.add_user(1, 5, ProjectRole::ProjectMember));
        assert!(snapshot.add_group(1, 10, ProjectRole::ProjectViewer));
        assert!(snapshot.add_group(1, 11, ProjectRole::ProjectManager));
        assert!(snapshot.add_user(3, 2, ProjectRole::ProjectManager));
        snapshot
    }

    #[test]
    fn test_highest_group_role_wins() {
        let snapshot = snapshot();
        let model = PermissionModel::new(&snapshot);
        assert_eq!(model.get_user_role(1, 3), Some(ProjectRole::ProjectManager));
        assert_eq!(model.get_user_role(1, 4), Some(ProjectRole::ProjectViewer));
        assert_eq!(model.get_user_role(1, 1), None);
        assert_eq!(model.get_user_role(99, 3), None);
    }

    #[test]
    fn test_direct_and_group_roles_combine() {
        let mut snapshot = snapshot();
        assert!(snapshot.add_user(1, 3, ProjectRole::ProjectViewer));
        let model = PermissionModel::new(&snapshot);
        assert_eq!(model.get_user_role(1, 3), Some(ProjectRole::ProjectManager));
    }

    #[test]
    fn test_everybody_allowed_grants_member() {
        let snapshot = snapshot();
        let model = PermissionModel::new(&snapshot);
        assert!(model.is_member(2, 3));
        assert_eq!(model.get_user_role(2, 3), None);
        assert_eq!(model.effective_role(2, 3), Some(ProjectRole::ProjectMember));
        assert!(!model.is_member(2, 4));
        assert!(!model.is_member(1, 1));
    }

    #[test]
    fn test_assignable_excludes_disabled_locked_and_viewers() {
        let snapshot = snapshot();
        let model = PermissionModel::new(&snapshot);
        assert!(model.is_assignable(1, 2));
        assert!(model.is_assignable(1, 3));
        assert!(!model.is_assignable(1, 4));
        assert!(!model.is_assignable(1, 5));
        assert!(!model.is_assignable(1, 99));

        assert_eq!(
            model.get_assignable_users(1),
            vec![(2, "Alice".to_string()), (3, "alice".to_string())]
        );
    }

    #[test]
    fn test_group_viewer_is_not_assignable() {
        let mut snapshot = snapshot();
        assert!(snapshot.remove_group_member(11, 3));
        let model = PermissionModel::new(&snapshot);
        assert_eq!(model.get_user_role(1, 3), Some(ProjectRole::ProjectViewer));
        assert!(model.is_member(1, 3));
        assert!(!model.is_assignable(1, 3));
    }

    #[test]
    fn test_everybody_allowed_assignable_users() {
        let snapshot = snapshot();
        let model = PermissionModel::new(&snapshot);
        let ids: Vec<i64> = model.get_assignable_users(2).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(model.get_assignable_users(42).is_empty());
    }

    #[test]
    fn test_assignable_users_list_options() {
        let snapshot = snapshot();
        let model = PermissionModel::new(&snapshot);

        let list = model.get_assignable_users_list(
            1,
            AssignableListOptions {
                unassigned: true,
                everybody: true,
                single_user: false,
            },
        );
        assert_eq!(list[0], (EVERYBODY_ID, "Everybody".to_string()));
        assert_eq!(list[1], (UNASSIGNED_ID, "Unassigned".to_string()));
        assert_eq!(list.len(), 4);

        let single = AssignableListOptions {
            single_user: true,
            ..AssignableListOptions::default()
        };
        assert_eq!(model.get_assignable_users_list(3, single), vec![(2, "Alice".to_string())]);
        assert_eq!(model.get_assignable_users_list(1, single).len(), 3);
    }

    #[test]
    fn test_access_and_permissions() {
        let snapshot = snapshot();
        let model = PermissionModel::new(&snapshot);
        assert!(model.can_access(1, 1));
        assert!(model.can_access(1, 4));
        assert!(!model.can_access(3, 3));
        assert!(!model.can_access(77, 1));

        assert!(model.is_manager(1, 3));
        assert!(!model.is_manager(1, 2));

        assert!(model.has_permission(1, 2, ProjectPermissions::CREATE_TASKS));
        assert!(!model.has_permission(1, 2, ProjectPermissions::MANAGE_MEMBERS));
        assert!(model.has_permission(1, 1, ProjectPermissions::MANAGE_PROJECT));
        assert!(!model.has_permission(1, 4, ProjectPermissions::VIEW_BOARD));

        assert!(model.require_permission(1, 3, ProjectPermissions::MANAGE_BOARD).is_ok());
        let denied = model
            .require_permission(1, 2, ProjectPermissions::MANAGE_BOARD)
            .unwrap_err();
        assert!(denied.is_forbidden());
        let missing = model
            .require_permission(77, 1, ProjectPermissions::VIEW_BOARD)
            .unwrap_err();
        assert_eq!(missing.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_users_and_groupings() {
        let snapshot = snapshot();
        let model = PermissionModel::new(&snapshot);

        let users = model.get_users(1);
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].user_id, 2);
        assert_eq!(users[1].display_name, "dave");

        let grouped = model.users_grouped_by_role(1);
        let roles: Vec<ProjectRole> = grouped.iter().map(|(role, _)| *role).collect();
        assert_eq!(
            roles,
            vec![
                ProjectRole::ProjectManager,
                ProjectRole::ProjectMember,
                ProjectRole::ProjectViewer
            ]
        );
        assert_eq!(grouped[0].1, vec![(3, "alice".to_string())]);
        assert_eq!(grouped[2].1, vec![(4, "carol".to_string())]);
    }

    #[test]
    fn test_projects_by_user_and_active_ids() {
        let snapshot = snapshot();
        let model = PermissionModel::new(&snapshot);

        assert_eq!(
            model.get_projects_by_user(2, &[]),
            vec![(3, "Archive".to_string()), (1, "Private".to_string())]
        );
        assert_eq!(
            model.get_projects_by_user(2, &[ProjectStatus::Active]),
            vec![(1, "Private".to_string())]
        );
        assert_eq!(model.get_projects_by_user(3, &[]), vec![(1, "Private".to_string())]);

        assert_eq!(model.get_active_project_ids(2), BTreeSet::from([1, 2]));
        assert_eq!(model.get_active_project_ids(4), BTreeSet::from([1]));
    }

    #[test]
    fn test_role_lookups_are_memoized() {
        let snapshot = snapshot();
        let model = PermissionModel::new(&snapshot);
        model.get_user_role(1, 3);
        model.get_user_role(1, 3);
        assert_eq!(model.roles.borrow().len(), 1);
    }
}
