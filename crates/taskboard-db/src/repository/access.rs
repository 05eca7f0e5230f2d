//! Loads the access tables into an [`AccessSnapshot`].

use taskboard_common::error::TaskboardResult;
use tracing::debug;

use crate::snapshot::AccessSnapshot;

use super::{groups, project_group_roles, project_user_roles, projects, users};

/// Read users, groups, projects and every role assignment in one go.
pub async fn load_snapshot(pool: &sqlx::AnyPool) -> TaskboardResult<AccessSnapshot> {
    let users = users::list_users(pool).await?;
    let groups = groups::list_groups(pool).await?;
    let projects = projects::list_projects(pool).await?;
    let user_roles = project_user_roles::list_all(pool).await?;
    let group_roles = project_group_roles::list_all(pool).await?;
    let memberships = groups::list_memberships(pool).await?;

    debug!(
        users = users.len(),
        projects = projects.len(),
        assignments = user_roles.len() + group_roles.len(),
        "loaded access snapshot"
    );

    Ok(AccessSnapshot::from_parts(
        users,
        groups,
        projects,
        user_roles,
        group_roles,
        memberships,
    ))
}
