//! Project repository.

use taskboard_common::error::TaskboardResult;
use taskboard_common::models::{Project, ProjectStatus};
use taskboard_common::validation::validate_name;

/// Create an active project.
pub async fn create_project(
    pool: &sqlx::AnyPool,
    name: &str,
    is_everybody_allowed: bool,
) -> TaskboardResult<Project> {
    validate_name(name)?;
    let project = sqlx::query_as::<_, Project>(
        r#"
        INSERT INTO projects (name, is_active, is_everybody_allowed, is_public)
        VALUES (?, 1, ?, 0)
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(i64::from(is_everybody_allowed))
    .fetch_one(pool)
    .await?;
    Ok(project)
}

pub async fn find_by_id(pool: &sqlx::AnyPool, id: i64) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Find a project through its public board token.
pub async fn find_by_token(pool: &sqlx::AnyPool, token: &str) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE token = ? AND is_public = 1")
        .bind(token)
        .fetch_optional(pool)
        .await
}

pub async fn list_projects(pool: &sqlx::AnyPool) -> Result<Vec<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY name")
        .fetch_all(pool)
        .await
}

pub async fn set_status(pool: &sqlx::AnyPool, id: i64, status: ProjectStatus) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE projects SET is_active = ? WHERE id = ?")
        .bind(i64::from(status == ProjectStatus::Active))
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Delete a project together with its role assignments, board and tasks.
pub async fn remove_project(pool: &sqlx::AnyPool, id: i64) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    for table in [
        "project_has_users",
        "project_has_groups",
        "tasks",
        "columns",
        "swimlanes",
        "categories",
    ] {
        sqlx::query(&format!("DELETE FROM {table} WHERE project_id = ?"))
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    let result = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected() == 1)
}
