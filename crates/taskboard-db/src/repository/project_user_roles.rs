//! Direct project role assignments (`project_has_users`).

use taskboard_common::models::ProjectUserRole;
use taskboard_common::roles::ProjectRole;

/// Grant `role` to a user. Returns `false` if the user already has a role.
pub async fn add_user(
    pool: &sqlx::AnyPool,
    project_id: i64,
    user_id: i64,
    role: ProjectRole,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO project_has_users (project_id, user_id, role)
        VALUES (?, ?, ?)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(project_id)
    .bind(user_id)
    .bind(role.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn remove_user(pool: &sqlx::AnyPool, project_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM project_has_users WHERE project_id = ? AND user_id = ?")
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn change_user_role(
    pool: &sqlx::AnyPool,
    project_id: i64,
    user_id: i64,
    role: ProjectRole,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE project_has_users SET role = ? WHERE project_id = ? AND user_id = ?")
        .bind(role.as_str())
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// The user's direct role, ignoring groups.
pub async fn find_role(
    pool: &sqlx::AnyPool,
    project_id: i64,
    user_id: i64,
) -> Result<Option<ProjectRole>, sqlx::Error> {
    let assignment = sqlx::query_as::<_, ProjectUserRole>(
        "SELECT * FROM project_has_users WHERE project_id = ? AND user_id = ?",
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(assignment.map(|a| a.role))
}

pub async fn list_for_project(
    pool: &sqlx::AnyPool,
    project_id: i64,
) -> Result<Vec<ProjectUserRole>, sqlx::Error> {
    sqlx::query_as::<_, ProjectUserRole>("SELECT * FROM project_has_users WHERE project_id = ?")
        .bind(project_id)
        .fetch_all(pool)
        .await
}

pub async fn list_all(pool: &sqlx::AnyPool) -> Result<Vec<ProjectUserRole>, sqlx::Error> {
    sqlx::query_as::<_, ProjectUserRole>("SELECT * FROM project_has_users")
        .fetch_all(pool)
        .await
}
