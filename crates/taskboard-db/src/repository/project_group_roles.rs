//! Group project role assignments (`project_has_groups`).

use taskboard_common::models::ProjectGroupRole;
use taskboard_common::roles::ProjectRole;

/// Grant `role` to a group. Returns `false` if the group already has a role.
pub async fn add_group(
    pool: &sqlx::AnyPool,
    project_id: i64,
    group_id: i64,
    role: ProjectRole,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO project_has_groups (project_id, group_id, role)
        VALUES (?, ?, ?)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(project_id)
    .bind(group_id)
    .bind(role.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn remove_group(pool: &sqlx::AnyPool, project_id: i64, group_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM project_has_groups WHERE project_id = ? AND group_id = ?")
        .bind(project_id)
        .bind(group_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn change_group_role(
    pool: &sqlx::AnyPool,
    project_id: i64,
    group_id: i64,
    role: ProjectRole,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE project_has_groups SET role = ? WHERE project_id = ? AND group_id = ?")
        .bind(role.as_str())
        .bind(project_id)
        .bind(group_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn list_for_project(
    pool: &sqlx::AnyPool,
    project_id: i64,
) -> Result<Vec<ProjectGroupRole>, sqlx::Error> {
    sqlx::query_as::<_, ProjectGroupRole>("SELECT * FROM project_has_groups WHERE project_id = ?")
        .bind(project_id)
        .fetch_all(pool)
        .await
}

pub async fn list_all(pool: &sqlx::AnyPool) -> Result<Vec<ProjectGroupRole>, sqlx::Error> {
    sqlx::query_as::<_, ProjectGroupRole>("SELECT * FROM project_has_groups")
        .fetch_all(pool)
        .await
}
