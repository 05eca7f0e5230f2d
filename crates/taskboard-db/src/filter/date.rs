//! Date search values: `2026-03-01`, `<=2026-03-01`, `>today`, `yesterday`.
//!
//! Dates are matched against unix-second columns using UTC day boundaries.
//! Unset dates (`0`) never match.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use regex::Regex;

use crate::query::QueryBuilder;

static DATE_EXPR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(<=|>=|<|>)?\s*([A-Za-z]+|\d{4}-\d{1,2}-\d{1,2})$").unwrap());

/// Task date column targeted by a date filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateField {
    Due,
    Started,
    Created,
    Modified,
    Completed,
}

impl DateField {
    pub fn column(self) -> &'static str {
        match self {
            Self::Due => "tasks.date_due",
            Self::Started => "tasks.date_started",
            Self::Created => "tasks.date_creation",
            Self::Modified => "tasks.date_modification",
            Self::Completed => "tasks.date_completed",
        }
    }

    pub fn prefixes(self) -> &'static [&'static str] {
        match self {
            Self::Due => &["due"],
            Self::Started => &["started", "start"],
            Self::Created => &["created"],
            Self::Modified => &["modified", "updated"],
            Self::Completed => &["completed"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Lt,
    Lte,
    Gt,
    Gte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DateExpr {
    comparison: Option<Comparison>,
    day: NaiveDate,
}

fn parse(value: &str, today: NaiveDate) -> Option<DateExpr> {
    let caps = DATE_EXPR.captures(value.trim())?;
    let comparison = match caps.get(1).map(|m| m.as_str()) {
        Some("<") => Some(Comparison::Lt),
        Some("<=") => Some(Comparison::Lte),
        Some(">") => Some(Comparison::Gt),
        Some(">=") => Some(Comparison::Gte),
        _ => None,
    };
    let day = match caps[2].to_ascii_lowercase().as_str() {
        "today" => today,
        "tomorrow" => today.checked_add_days(Days::new(1))?,
        "yesterday" => today.checked_sub_days(Days::new(1))?,
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d").ok()?,
    };
    Some(DateExpr { comparison, day })
}

fn day_start(day: NaiveDate) -> Option<i64> {
    Some(day.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

/// Narrow `query` by a date expression relative to `today`.
///
/// Returns `false` and leaves the query untouched when the value does not
/// parse.
pub(crate) fn apply(field: DateField, query: &mut QueryBuilder, value: &str, today: NaiveDate) -> bool {
    let Some(expr) = parse(value, today) else {
        return false;
    };
    let (Some(start), Some(end)) = (
        day_start(expr.day),
        expr.day.checked_add_days(Days::new(1)).and_then(day_start),
    ) else {
        return false;
    };

    let column = field.column();
    query.gt(column, 0);
    match expr.comparison {
        None => query.gte(column, start).lt(column, end),
        Some(Comparison::Lt) => query.lt(column, start),
        Some(Comparison::Lte) => query.lt(column, end),
        Some(Comparison::Gt) => query.gte(column, end),
        Some(Comparison::Gte) => query.gte(column, start),
    };
    true
}
