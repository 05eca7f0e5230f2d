//! Manual `sqlx::FromRow<'_, sqlx::any::AnyRow>` implementations for the
//! taskboard-common model types.
//!
//! `sqlx::AnyPool` only decodes primitive types natively (i64, f64, bool,
//! String, bytes). Flags are stored as INTEGER and read back as `i64`, roles
//! as their string constants, timestamps as text.
//!
//! The impls live here rather than in taskboard-db because both the trait and
//! `AnyRow` are foreign to that crate.

use chrono::{DateTime, Utc};
use sqlx::{any::AnyRow, Row};

use crate::models::{
    Category, Column, Group, GroupMember, Project, ProjectGroupRole, ProjectUserRole, Swimlane,
    Task, User,
};
use crate::roles::{ApplicationRole, ProjectRole};

// ── Internal helpers ──────────────────────────────────────────────────────────

fn flag(row: &AnyRow, col: &str) -> Result<bool, sqlx::Error> {
    let v: i64 = row.try_get(col)?;
    Ok(v != 0)
}

fn text_or_empty(row: &AnyRow, col: &str) -> Result<String, sqlx::Error> {
    let s: Option<String> = row.try_get(col)?;
    Ok(s.unwrap_or_default())
}

fn opt_dt(row: &AnyRow, col: &str) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    let s: Option<String> = row.try_get(col)?;
    s.filter(|v| !v.is_empty())
        .map(|v| parse_dt(&v).map_err(sqlx::Error::Decode))
        .transpose()
}

fn parse_dt(s: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error + Send + Sync + 'static>> {
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Ok(d.with_timezone(&Utc));
    }
    if let Ok(d) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(d.and_utc());
    }
    if let Ok(d) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(d.and_utc());
    }
    Err(format!("cannot parse timestamp '{s}'").into())
}

fn project_role(row: &AnyRow, col: &str) -> Result<ProjectRole, sqlx::Error> {
    let s: String = row.try_get(col)?;
    s.parse().map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn application_role(row: &AnyRow, col: &str) -> Result<ApplicationRole, sqlx::Error> {
    let s: String = row.try_get(col)?;
    s.parse().map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

// ── Users & groups ────────────────────────────────────────────────────────────

impl<'r> sqlx::FromRow<'r, AnyRow> for User {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            name: text_or_empty(row, "name")?,
            email: row.try_get("email")?,
            role: application_role(row, "role")?,
            is_active: flag(row, "is_active")?,
            locked_until: opt_dt(row, "locked_until")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, AnyRow> for Group {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Group {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            external_id: row.try_get("external_id")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, AnyRow> for GroupMember {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(GroupMember {
            group_id: row.try_get("group_id")?,
            user_id: row.try_get("user_id")?,
        })
    }
}

// ── Projects & role assignments ───────────────────────────────────────────────

impl<'r> sqlx::FromRow<'r, AnyRow> for Project {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Project {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            is_active: flag(row, "is_active")?,
            is_everybody_allowed: flag(row, "is_everybody_allowed")?,
            is_public: flag(row, "is_public")?,
            token: row.try_get("token")?,
            default_swimlane: row.try_get("default_swimlane")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, AnyRow> for ProjectUserRole {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(ProjectUserRole {
            project_id: row.try_get("project_id")?,
            user_id: row.try_get("user_id")?,
            role: project_role(row, "role")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, AnyRow> for ProjectGroupRole {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(ProjectGroupRole {
            project_id: row.try_get("project_id")?,
            group_id: row.try_get("group_id")?,
            role: project_role(row, "role")?,
        })
    }
}

// ── Board ─────────────────────────────────────────────────────────────────────

impl<'r> sqlx::FromRow<'r, AnyRow> for Column {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        let task_limit: i64 = row.try_get("task_limit")?;
        Ok(Column {
            id: row.try_get("id")?,
            project_id: row.try_get("project_id")?,
            title: row.try_get("title")?,
            position: row.try_get("position")?,
            task_limit: u32::try_from(task_limit).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            description: text_or_empty(row, "description")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, AnyRow> for Swimlane {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Swimlane {
            id: row.try_get("id")?,
            project_id: row.try_get("project_id")?,
            name: row.try_get("name")?,
            position: row.try_get("position")?,
            is_active: flag(row, "is_active")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, AnyRow> for Category {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Category {
            id: row.try_get("id")?,
            project_id: row.try_get("project_id")?,
            name: row.try_get("name")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, AnyRow> for Task {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Task {
            id: row.try_get("id")?,
            project_id: row.try_get("project_id")?,
            column_id: row.try_get("column_id")?,
            swimlane_id: row.try_get("swimlane_id")?,
            owner_id: row.try_get("owner_id")?,
            creator_id: row.try_get("creator_id")?,
            category_id: row.try_get("category_id")?,
            color_id: row.try_get("color_id")?,
            title: row.try_get("title")?,
            description: text_or_empty(row, "description")?,
            reference: text_or_empty(row, "reference")?,
            is_active: row.try_get("is_active")?,
            position: row.try_get("position")?,
            score: row.try_get("score")?,
            date_due: row.try_get("date_due")?,
            date_started: row.try_get("date_started")?,
            date_creation: row.try_get("date_creation")?,
            date_modification: row.try_get("date_modification")?,
            date_completed: row.try_get("date_completed")?,
        })
    }
}
