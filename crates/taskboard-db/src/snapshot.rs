//! Owned, in-memory copy of the access tables.
//!
//! Role assignments follow the same lifecycle rules as the database:
//! one row per `(project, user)` or `(project, group)`, duplicates rejected,
//! and everything attached to a project goes away with it.

use std::collections::BTreeMap;

use taskboard_common::models::{
    Group, GroupMember, Project, ProjectGroupRole, ProjectUserRole, User,
};
use taskboard_common::roles::ProjectRole;

use crate::permission::AccessDirectory;

#[derive(Debug, Clone, Default)]
pub struct AccessSnapshot {
    users: BTreeMap<i64, User>,
    groups: BTreeMap<i64, Group>,
    projects: BTreeMap<i64, Project>,
    user_roles: Vec<ProjectUserRole>,
    group_roles: Vec<ProjectGroupRole>,
    memberships: Vec<GroupMember>,
}

impl AccessSnapshot {
    /// Assemble a snapshot from loaded rows.
    pub fn from_parts(
        users: Vec<User>,
        groups: Vec<Group>,
        projects: Vec<Project>,
        user_roles: Vec<ProjectUserRole>,
        group_roles: Vec<ProjectGroupRole>,
        memberships: Vec<GroupMember>,
    ) -> Self {
        let mut snapshot = Self {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
            groups: groups.into_iter().map(|g| (g.id, g)).collect(),
            projects: projects.into_iter().map(|p| (p.id, p)).collect(),
            ..Self::default()
        };
        for r in user_roles {
            snapshot.add_user(r.project_id, r.user_id, r.role);
        }
        for r in group_roles {
            snapshot.add_group(r.project_id, r.group_id, r.role);
        }
        for m in memberships {
            snapshot.add_group_member(m.group_id, m.user_id);
        }
        snapshot
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn insert_group(&mut self, group: Group) {
        self.groups.insert(group.id, group);
    }

    pub fn insert_project(&mut self, project: Project) {
        self.projects.insert(project.id, project);
    }

    pub fn group(&self, group_id: i64) -> Option<&Group> {
        self.groups.get(&group_id)
    }

    // ── Direct assignments ──────────────────────────────────────────────────

    pub fn add_user(&mut self, project_id: i64, user_id: i64, role: ProjectRole) -> bool {
        if self
            .user_roles
            .iter()
            .any(|r| r.project_id == project_id && r.user_id == user_id)
        {
            return false;
        }
        self.user_roles.push(ProjectUserRole {
            project_id,
            user_id,
            role,
        });
        true
    }

    pub fn remove_user(&mut self, project_id: i64, user_id: i64) -> bool {
        let before = self.user_roles.len();
        self.user_roles
            .retain(|r| !(r.project_id == project_id && r.user_id == user_id));
        self.user_roles.len() != before
    }

    pub fn change_user_role(&mut self, project_id: i64, user_id: i64, role: ProjectRole) -> bool {
        match self
            .user_roles
            .iter_mut()
            .find(|r| r.project_id == project_id && r.user_id == user_id)
        {
            Some(assignment) => {
                assignment.role = role;
                true
            }
            None => false,
        }
    }

    // ── Group assignments ───────────────────────────────────────────────────

    pub fn add_group(&mut self, project_id: i64, group_id: i64, role: ProjectRole) -> bool {
        if self
            .group_roles
            .iter()
            .any(|r| r.project_id == project_id && r.group_id == group_id)
        {
            return false;
        }
        self.group_roles.push(ProjectGroupRole {
            project_id,
            group_id,
            role,
        });
        true
    }

    pub fn remove_group(&mut self, project_id: i64, group_id: i64) -> bool {
        let before = self.group_roles.len();
        self.group_roles
            .retain(|r| !(r.project_id == project_id && r.group_id == group_id));
        self.group_roles.len() != before
    }

    pub fn change_group_role(&mut self, project_id: i64, group_id: i64, role: ProjectRole) -> bool {
        match self
            .group_roles
            .iter_mut()
            .find(|r| r.project_id == project_id && r.group_id == group_id)
        {
            Some(assignment) => {
                assignment.role = role;
                true
            }
            None => false,
        }
    }

    // ── Group membership ────────────────────────────────────────────────────

    pub fn add_group_member(&mut self, group_id: i64, user_id: i64) -> bool {
        let member = GroupMember { group_id, user_id };
        if self.memberships.contains(&member) {
            return false;
        }
        self.memberships.push(member);
        true
    }

    pub fn remove_group_member(&mut self, group_id: i64, user_id: i64) -> bool {
        let before = self.memberships.len();
        self.memberships
            .retain(|m| !(m.group_id == group_id && m.user_id == user_id));
        self.memberships.len() != before
    }

    /// Delete a project with all of its role assignments.
    pub fn remove_project(&mut self, project_id: i64) -> bool {
        if self.projects.remove(&project_id).is_none() {
            return false;
        }
        self.user_roles.retain(|r| r.project_id != project_id);
        self.group_roles.retain(|r| r.project_id != project_id);
        true
    }
}

impl AccessDirectory for AccessSnapshot {
    fn project(&self, project_id: i64) -> Option<&Project> {
        self.projects.get(&project_id)
    }

    fn projects(&self) -> Vec<&Project> {
        self.projects.values().collect()
    }

    fn user(&self, user_id: i64) -> Option<&User> {
        self.users.get(&user_id)
    }

    fn users(&self) -> Vec<&User> {
        self.users.values().collect()
    }

    fn user_roles(&self, project_id: i64) -> Vec<ProjectUserRole> {
        self.user_roles
            .iter()
            .filter(|r| r.project_id == project_id)
            .copied()
            .collect()
    }

    fn group_roles(&self, project_id: i64) -> Vec<ProjectGroupRole> {
        self.group_roles
            .iter()
            .filter(|r| r.project_id == project_id)
            .copied()
            .collect()
    }

    fn roles_of_user(&self, user_id: i64) -> Vec<ProjectUserRole> {
        self.user_roles
            .iter()
            .filter(|r| r.user_id == user_id)
            .copied()
            .collect()
    }

    fn groups_of_user(&self, user_id: i64) -> Vec<i64> {
        self.memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.group_id)
            .collect()
    }

    fn members_of_group(&self, group_id: i64) -> Vec<i64> {
        self.memberships
            .iter()
            .filter(|m| m.group_id == group_id)
            .map(|m| m.user_id)
            .collect()
    }
}
