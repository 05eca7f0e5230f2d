//! User repository: accounts and their enabled/locked state.

use chrono::{DateTime, Utc};
use taskboard_common::models::User;
use taskboard_common::roles::ApplicationRole;

/// Create a new, active user account.
pub async fn create_user(
    pool: &sqlx::AnyPool,
    username: &str,
    name: &str,
    email: Option<&str>,
    role: ApplicationRole,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, name, email, role, is_active)
        VALUES (?, ?, ?, ?, 1)
        RETURNING *
        "#,
    )
    .bind(username)
    .bind(name)
    .bind(email)
    .bind(role.as_str())
    .fetch_one(pool)
    .await
}

/// Find a user by their unique ID.
pub async fn find_by_id(pool: &sqlx::AnyPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Find a user by username (case-insensitive).
pub async fn find_by_username(
    pool: &sqlx::AnyPool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER(?)")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// All users, by username.
pub async fn list_users(pool: &sqlx::AnyPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username")
        .fetch_all(pool)
        .await
}

/// Enable or disable an account.
pub async fn set_active(pool: &sqlx::AnyPool, id: i64, is_active: bool) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
        .bind(i64::from(is_active))
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Lock an account until `until`, or unlock it with `None`.
pub async fn lock_until(
    pool: &sqlx::AnyPool,
    id: i64,
    until: Option<DateTime<Utc>>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET locked_until = ? WHERE id = ?")
        .bind(until.map(|t| t.to_rfc3339()))
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}
