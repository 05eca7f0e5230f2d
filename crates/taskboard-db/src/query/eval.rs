//! Row-level evaluation of conditions, shared by in-memory execution.
//!
//! Semantics follow SQL closely enough for the two backends to agree:
//! comparisons against NULL are false, numeric-looking values compare
//! numerically, text compares case-sensitively except for `Contains` and
//! `EqIgnoreCase`. Those fold ASCII letters only, like SQLite's `LOWER()`.

use std::cmp::Ordering;

use serde_json::Value;

use super::{Clause, Condition, Operand, Operator, Row};

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// SQL-ish ordering of two values; `None` when either side is NULL or the
/// values are not comparable.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    if a.is_null() || b.is_null() {
        return None;
    }
    if let (Value::String(x), Value::String(y)) = (a, b) {
        return Some(x.cmp(y));
    }
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y),
        _ => Some(value_to_text(a).cmp(&value_to_text(b))),
    }
}

/// Textual form used for LIKE-style matching.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
        other => other.to_string(),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    compare_values(a, b) == Some(Ordering::Equal)
}

fn matches_clause(clause: &Clause, row: &Row, resolve: &dyn Fn(&str) -> String) -> bool {
    let key = resolve(&clause.column);
    let current = row.get(&key).unwrap_or(&Value::Null);

    match (&clause.operator, &clause.operand) {
        (Operator::IsNull, _) => current.is_null(),
        (Operator::NotNull, _) => !current.is_null(),
        (Operator::Eq, Operand::Value(v)) => values_equal(current, v),
        (Operator::Neq, Operand::Value(v)) => {
            !current.is_null() && !v.is_null() && !values_equal(current, v)
        }
        (Operator::Gt, Operand::Value(v)) => compare_values(current, v) == Some(Ordering::Greater),
        (Operator::Gte, Operand::Value(v)) => matches!(
            compare_values(current, v),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        (Operator::Lt, Operand::Value(v)) => compare_values(current, v) == Some(Ordering::Less),
        (Operator::Lte, Operand::Value(v)) => matches!(
            compare_values(current, v),
            Some(Ordering::Less | Ordering::Equal)
        ),
        (Operator::In | Operator::InSubquery, Operand::List(values)) => {
            values.iter().any(|v| values_equal(current, v))
        }
        (Operator::NotIn, Operand::List(values)) => {
            !current.is_null() && !values.iter().any(|v| values_equal(current, v))
        }
        (Operator::Contains, Operand::Value(v)) => {
            !current.is_null()
                && value_to_text(current)
                    .to_ascii_lowercase()
                    .contains(&value_to_text(v).to_ascii_lowercase())
        }
        (Operator::EqIgnoreCase, Operand::Value(v)) => {
            !current.is_null() && value_to_text(current).eq_ignore_ascii_case(&value_to_text(v))
        }
        // Subqueries are materialised into lists before evaluation.
        (Operator::InSubquery, Operand::Select(_)) => {
            panic!("subquery on {} was not materialised before evaluation", clause.column)
        }
        _ => false,
    }
}

/// Evaluate one condition against a row whose keys are `table.column`.
pub(crate) fn matches_condition(
    condition: &Condition,
    row: &Row,
    resolve: &dyn Fn(&str) -> String,
) -> bool {
    match condition {
        Condition::Clause(clause) => matches_clause(clause, row, resolve),
        Condition::All(children) => children.iter().all(|c| matches_condition(c, row, resolve)),
        Condition::Any(children) => children.iter().any(|c| matches_condition(c, row, resolve)),
    }
}
