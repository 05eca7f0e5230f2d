//! AnyPool glue for untyped rows.
//!
//! The query builder works with JSON rows and JSON parameters. `sqlx::AnyRow`
//! only decodes primitive types, so each cell is probed as integer, float,
//! text and finally bool; anything else becomes `null`. Parameters are bound
//! the other way round, with booleans as integers.

use serde_json::Value;
use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, Column, Row as _};

use crate::query::Row;

type AnyQuery<'q> = Query<'q, Any, AnyArguments<'q>>;

fn cell(row: &AnyRow, idx: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    Value::Null
}

/// Decode every column of `row`, keyed by result column name.
pub fn row_to_json(row: &AnyRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| (column.name().to_string(), cell(row, idx)))
        .collect()
}

/// Bind rendered parameters in order.
pub fn bind_params<'q>(mut query: AnyQuery<'q>, params: &[Value]) -> AnyQuery<'q> {
    for param in params {
        query = match param {
            Value::Null => query.bind(None::<i64>),
            Value::Bool(b) => query.bind(i64::from(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => query.bind(i),
                None => query.bind(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => query.bind(s.clone()),
            other => query.bind(other.to_string()),
        };
    }
    query
}
