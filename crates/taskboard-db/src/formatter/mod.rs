//! Formatters reshape task rows for board, list and autocomplete views.
//!
//! They are pure: rows in, serializable structure out. Row order is always
//! preserved within whatever bucket a row lands in.

mod autocomplete;
mod board;
mod group;

use serde_json::Value;

use crate::query::Row;

pub use autocomplete::{AutoCompleteFormatter, AutoCompleteItem};
pub use board::{BoardColumn, BoardFormatter, BoardSwimlane};
pub use group::{Dimension, GroupFormatter, TaskGroup};

pub trait Formatter {
    type Output;

    fn format(&self, rows: &[Row]) -> Self::Output;
}

fn int(row: &Row, key: &str) -> i64 {
    match row.get(key) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}

fn text<'a>(row: &'a Row, key: &str) -> Option<&'a str> {
    row.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}
