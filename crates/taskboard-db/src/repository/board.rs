//! Board layout repository: columns, swimlanes and categories.

use taskboard_common::models::{Category, Column, Swimlane};

pub async fn create_column(
    pool: &sqlx::AnyPool,
    project_id: i64,
    title: &str,
    position: i64,
) -> Result<Column, sqlx::Error> {
    sqlx::query_as::<_, Column>(
        "INSERT INTO columns (project_id, title, position) VALUES (?, ?, ?) RETURNING *",
    )
    .bind(project_id)
    .bind(title)
    .bind(position)
    .fetch_one(pool)
    .await
}

/// Columns of a project, left to right.
pub async fn list_columns(pool: &sqlx::AnyPool, project_id: i64) -> Result<Vec<Column>, sqlx::Error> {
    sqlx::query_as::<_, Column>("SELECT * FROM columns WHERE project_id = ? ORDER BY position, id")
        .bind(project_id)
        .fetch_all(pool)
        .await
}

pub async fn create_swimlane(
    pool: &sqlx::AnyPool,
    project_id: i64,
    name: &str,
    position: i64,
) -> Result<Swimlane, sqlx::Error> {
    sqlx::query_as::<_, Swimlane>(
        "INSERT INTO swimlanes (project_id, name, position, is_active) VALUES (?, ?, ?, 1) RETURNING *",
    )
    .bind(project_id)
    .bind(name)
    .bind(position)
    .fetch_one(pool)
    .await
}

/// Swimlanes of a project, top to bottom. The default swimlane has no row.
pub async fn list_swimlanes(pool: &sqlx::AnyPool, project_id: i64) -> Result<Vec<Swimlane>, sqlx::Error> {
    sqlx::query_as::<_, Swimlane>("SELECT * FROM swimlanes WHERE project_id = ? ORDER BY position, id")
        .bind(project_id)
        .fetch_all(pool)
        .await
}

pub async fn create_category(
    pool: &sqlx::AnyPool,
    project_id: i64,
    name: &str,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>("INSERT INTO categories (project_id, name) VALUES (?, ?) RETURNING *")
        .bind(project_id)
        .bind(name)
        .fetch_one(pool)
        .await
}

pub async fn list_categories(pool: &sqlx::AnyPool, project_id: i64) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE project_id = ? ORDER BY name")
        .bind(project_id)
        .fetch_all(pool)
        .await
}
