//! Group repository: groups and their members.

use taskboard_common::error::TaskboardResult;
use taskboard_common::models::{Group, GroupMember};
use taskboard_common::validation::validate_name;

/// Create a group.
pub async fn create_group(
    pool: &sqlx::AnyPool,
    name: &str,
    external_id: Option<&str>,
) -> TaskboardResult<Group> {
    validate_name(name)?;
    let group = sqlx::query_as::<_, Group>(
        r#"INSERT INTO "groups" (name, external_id) VALUES (?, ?) RETURNING *"#,
    )
    .bind(name)
    .bind(external_id)
    .fetch_one(pool)
    .await?;
    Ok(group)
}

pub async fn find_by_id(pool: &sqlx::AnyPool, id: i64) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>(r#"SELECT * FROM "groups" WHERE id = ?"#)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_groups(pool: &sqlx::AnyPool) -> Result<Vec<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>(r#"SELECT * FROM "groups" ORDER BY name"#)
        .fetch_all(pool)
        .await
}

/// Add a user to a group. Returns `false` if already a member.
pub async fn add_member(pool: &sqlx::AnyPool, group_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO group_has_users (group_id, user_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
    )
    .bind(group_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Remove a user from a group. Returns `false` if not a member.
pub async fn remove_member(pool: &sqlx::AnyPool, group_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM group_has_users WHERE group_id = ? AND user_id = ?")
        .bind(group_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Every group membership.
pub async fn list_memberships(pool: &sqlx::AnyPool) -> Result<Vec<GroupMember>, sqlx::Error> {
    sqlx::query_as::<_, GroupMember>("SELECT group_id, user_id FROM group_has_users")
        .fetch_all(pool)
        .await
}
