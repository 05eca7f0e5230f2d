//! In-memory [`QueryExecutor`] over tables of JSON rows.
//!
//! Rows are stored unqualified (`{"id": 1, "title": ..}`) and widened to
//! `table.column` keys while a select runs, so joined tables never collide.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use taskboard_common::error::{TaskboardError, TaskboardResult};

use crate::query::{
    compare_values, matches_condition, Condition, Direction, Operand, QueryExecutor, Row, Select,
};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<Row>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw row to `table`.
    pub fn insert(&mut self, table: impl Into<String>, row: Row) {
        self.tables.entry(table.into()).or_default().push(row);
    }

    /// Serialize a model into a row of `table`.
    pub fn insert_record<T: Serialize>(
        &mut self,
        table: impl Into<String>,
        record: &T,
    ) -> TaskboardResult<()> {
        let table = table.into();
        match serde_json::to_value(record).map_err(anyhow::Error::from)? {
            Value::Object(row) => {
                self.insert(table, row);
                Ok(())
            }
            other => Err(TaskboardError::validation(format!(
                "cannot store {other} as a row of {table}"
            ))),
        }
    }

    pub fn rows(&self, table: &str) -> &[Row] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    fn widen(table: &str, row: &Row, into: &mut Row) {
        for (column, value) in row {
            into.insert(format!("{table}.{column}"), value.clone());
        }
    }

    fn materialize(&self, condition: &Condition) -> TaskboardResult<Condition> {
        Ok(match condition {
            Condition::Clause(clause) => match &clause.operand {
                Operand::Select(sub) => {
                    let mut clause = clause.clone();
                    clause.operand = Operand::List(self.first_column(sub, None)?);
                    Condition::Clause(clause)
                }
                _ => condition.clone(),
            },
            Condition::All(children) => Condition::All(
                children
                    .iter()
                    .map(|c| self.materialize(c))
                    .collect::<TaskboardResult<_>>()?,
            ),
            Condition::Any(children) => Condition::Any(
                children
                    .iter()
                    .map(|c| self.materialize(c))
                    .collect::<TaskboardResult<_>>()?,
            ),
        })
    }

    /// Values of the first selected column of `sub`.
    fn first_column(&self, sub: &Select, limit: Option<usize>) -> TaskboardResult<Vec<Value>> {
        let mut sub = sub.clone();
        if limit.is_some() {
            sub.limit = limit;
        }
        let key = match sub.effective_columns().first() {
            Some(column) if !column.expr.ends_with(".*") => column.output_name().to_string(),
            _ => "id".to_string(),
        };
        Ok(self
            .fetch(&sub)?
            .into_iter()
            .map(|mut row| row.remove(&key).unwrap_or(Value::Null))
            .collect())
    }
}

/// Ordering used for `ORDER BY`: NULL sorts before everything.
fn order_values(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => compare_values(a, b).unwrap_or(Ordering::Equal),
    }
}

impl QueryExecutor for MemoryStore {
    fn fetch(&self, select: &Select) -> TaskboardResult<Vec<Row>> {
        let source = select.source();

        let mut rows: Vec<Row> = self
            .rows(source)
            .iter()
            .map(|row| {
                let mut wide = Row::new();
                Self::widen(source, row, &mut wide);
                wide
            })
            .collect();

        for join in &select.joins {
            let local = format!("{}.{}", join.source_table, join.local_key);
            let candidates = self.rows(&join.table);
            for wide in &mut rows {
                let Some(key) = wide.get(&local).cloned() else {
                    continue;
                };
                let found = candidates.iter().find(|candidate| {
                    candidate
                        .get(&join.foreign_key)
                        .and_then(|v| compare_values(v, &key))
                        == Some(Ordering::Equal)
                });
                if let Some(found) = found {
                    Self::widen(&join.table, found, wide);
                }
            }
        }

        let conditions = select
            .conditions
            .iter()
            .map(|c| self.materialize(c))
            .collect::<TaskboardResult<Vec<_>>>()?;
        let resolve = |column: &str| select.qualify(column);
        rows.retain(|row| conditions.iter().all(|c| matches_condition(c, row, &resolve)));

        if !select.order_by.is_empty() {
            let keys: Vec<(String, Direction)> = select
                .order_by
                .iter()
                .map(|o| (select.qualify(&o.column), o.direction))
                .collect();
            rows.sort_by(|a, b| {
                keys.iter()
                    .map(|(key, direction)| {
                        let ord = order_values(
                            a.get(key).unwrap_or(&Value::Null),
                            b.get(key).unwrap_or(&Value::Null),
                        );
                        match direction {
                            Direction::Asc => ord,
                            Direction::Desc => ord.reverse(),
                        }
                    })
                    .find(|ord| *ord != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        let rows = rows
            .into_iter()
            .skip(select.offset.unwrap_or(0))
            .take(select.limit.unwrap_or(usize::MAX));

        let scalars = select
            .subqueries
            .iter()
            .map(|sub| {
                let value = self
                    .first_column(&sub.select, Some(1))?
                    .into_iter()
                    .next()
                    .unwrap_or(Value::Null);
                Ok((sub.alias.clone(), value))
            })
            .collect::<TaskboardResult<Vec<_>>>()?;

        let columns = select.effective_columns();
        Ok(rows
            .map(|wide| {
                let mut out = Row::new();
                for column in &columns {
                    if let Some(table) = column.expr.strip_suffix(".*") {
                        let prefix = format!("{table}.");
                        for (key, value) in &wide {
                            if let Some(name) = key.strip_prefix(&prefix) {
                                out.insert(name.to_string(), value.clone());
                            }
                        }
                    } else {
                        let value = wide
                            .get(&select.qualify(&column.expr))
                            .cloned()
                            .unwrap_or(Value::Null);
                        out.insert(column.output_name().to_string(), value);
                    }
                }
                for (alias, value) in &scalars {
                    out.insert(alias.clone(), value.clone());
                }
                out
            })
            .collect())
    }
}
