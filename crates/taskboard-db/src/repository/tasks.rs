//! Task repository: typed CRUD plus execution of built task queries.

use taskboard_common::error::TaskboardResult;
use taskboard_common::models::Task;
use tracing::debug;

use crate::any_compat::{bind_params, row_to_json};
use crate::formatter::Formatter;
use crate::query::{QueryBuilder, Row, SqlStatement};

/// Insert a task. The id is assigned by the database.
pub async fn create_task(pool: &sqlx::AnyPool, task: &Task) -> Result<Task, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        r#"
        INSERT INTO tasks (
            project_id, column_id, swimlane_id, owner_id, creator_id, category_id,
            color_id, title, description, reference, is_active, position, score,
            date_due, date_started, date_creation, date_modification, date_completed
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(task.project_id)
    .bind(task.column_id)
    .bind(task.swimlane_id)
    .bind(task.owner_id)
    .bind(task.creator_id)
    .bind(task.category_id)
    .bind(task.color_id.as_str())
    .bind(task.title.as_str())
    .bind(task.description.as_str())
    .bind(task.reference.as_str())
    .bind(task.is_active)
    .bind(task.position)
    .bind(task.score)
    .bind(task.date_due)
    .bind(task.date_started)
    .bind(task.date_creation)
    .bind(task.date_modification)
    .bind(task.date_completed)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &sqlx::AnyPool, id: i64) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Reassign a task; `0` unassigns it.
pub async fn set_owner(pool: &sqlx::AnyPool, id: i64, owner_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE tasks SET owner_id = ? WHERE id = ?")
        .bind(owner_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

async fn fetch(pool: &sqlx::AnyPool, statement: &SqlStatement) -> TaskboardResult<Vec<Row>> {
    debug!(sql = %statement.sql, params = statement.params.len(), "executing task query");
    let rows = bind_params(sqlx::query(&statement.sql), &statement.params)
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(row_to_json).collect())
}

/// Run a built query and apply its callbacks.
pub async fn find_all(pool: &sqlx::AnyPool, query: &QueryBuilder) -> TaskboardResult<Vec<Row>> {
    let rows = fetch(pool, &query.to_sql()).await?;
    Ok(query.apply_callbacks(rows))
}

pub async fn find_one(pool: &sqlx::AnyPool, query: &QueryBuilder) -> TaskboardResult<Option<Row>> {
    let mut query = query.clone();
    query.limit(1);
    Ok(find_all(pool, &query).await?.into_iter().next())
}

/// Number of rows the query matches, ignoring ordering and paging.
pub async fn count(pool: &sqlx::AnyPool, query: &QueryBuilder) -> TaskboardResult<usize> {
    let rows = fetch(pool, &query.count_sql()).await?;
    let count = rows
        .first()
        .and_then(|row| row.get("count"))
        .and_then(|v| v.as_u64())
        .unwrap_or_default();
    Ok(count as usize)
}

/// Run a built query and hand the rows to `formatter`.
pub async fn format<F: Formatter>(
    pool: &sqlx::AnyPool,
    query: &QueryBuilder,
    formatter: &F,
) -> TaskboardResult<F::Output> {
    let rows = find_all(pool, query).await?;
    Ok(formatter.format(&rows))
}
