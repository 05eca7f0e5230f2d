//! Query builder: fluent, cloneable predicate accumulation.
//!
//! A [`QueryBuilder`] owns its whole backing [`Select`]: source table, joins,
//! condition tree, ordering and paging. Nothing is shared between clones
//! except the row callbacks, which are immutable. Building performs no I/O;
//! rows are only produced when an execution method is handed a
//! [`QueryExecutor`] (the in-memory [`crate::store::MemoryStore`]) or when the
//! rendered SQL is run through [`crate::repository::tasks`].

mod eval;
pub mod sql;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use taskboard_common::error::TaskboardResult;

pub(crate) use eval::{compare_values, matches_condition, value_to_text};
pub use sql::SqlStatement;

/// A result row: column name to value.
pub type Row = serde_json::Map<String, Value>;

/// Post-execution transform over the whole result set.
pub type RowCallback = Arc<dyn Fn(Vec<Row>) -> Vec<Row> + Send + Sync>;

/// Something that can run a [`Select`] and return rows.
pub trait QueryExecutor {
    /// Run the select, honouring joins, conditions, ordering and paging.
    fn fetch(&self, select: &Select) -> TaskboardResult<Vec<Row>>;

    /// Number of matching rows, ignoring ordering and paging.
    fn count(&self, select: &Select) -> TaskboardResult<usize> {
        let mut unpaged = select.clone();
        unpaged.limit = None;
        unpaged.offset = None;
        Ok(self.fetch(&unpaged)?.len())
    }
}

// ============================================================
// Backing query
// ============================================================

/// Comparison applied by a [`Clause`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    /// Case-insensitive substring match
    Contains,
    /// Case-insensitive equality
    EqIgnoreCase,
    IsNull,
    NotNull,
    InSubquery,
}

/// Right-hand side of a [`Clause`].
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Nothing,
    Value(Value),
    List(Vec<Value>),
    Select(Box<Select>),
}

/// One predicate: `column operator operand`.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub column: String,
    pub operator: Operator,
    pub operand: Operand,
}

/// Condition tree. The root of a select is an implicit `All`.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Clause(Clause),
    /// Every child must hold
    All(Vec<Condition>),
    /// At least one child must hold
    Any(Vec<Condition>),
}

/// `LEFT JOIN table ON table.foreign_key = source_table.local_key`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub table: String,
    pub foreign_key: String,
    pub local_key: String,
    pub source_table: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

/// Selected column expression: `table.column`, `table.*`, optionally aliased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectColumn {
    pub expr: String,
    pub alias: Option<String>,
}

impl SelectColumn {
    /// Parse `"table.column AS alias"` (the `AS` is case-insensitive).
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();
        match lower.find(" as ") {
            Some(idx) => Self {
                expr: raw[..idx].trim().to_string(),
                alias: Some(raw[idx + 4..].trim().to_string()),
            },
            None => Self {
                expr: raw.to_string(),
                alias: None,
            },
        }
    }

    /// Key this column gets in a result row.
    pub fn output_name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias.as_str(),
            None => self.expr.rsplit('.').next().unwrap_or(self.expr.as_str()),
        }
    }
}

/// Scalar subquery exposed as a result column.
#[derive(Debug, Clone, PartialEq)]
pub struct SubqueryColumn {
    pub select: Box<Select>,
    pub alias: String,
}

/// The backing query a builder accumulates into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    pub table: Option<String>,
    pub columns: Vec<SelectColumn>,
    pub subqueries: Vec<SubqueryColumn>,
    pub joins: Vec<Join>,
    pub conditions: Vec<Condition>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl Select {
    /// Source table.
    ///
    /// # Panics
    /// Panics when no source table was registered; executing such a query is
    /// a configuration defect, not an empty result.
    pub fn source(&self) -> &str {
        match &self.table {
            Some(table) => table,
            None => panic!("query has no source table"),
        }
    }

    /// Qualify a bare column with the source table.
    pub fn qualify(&self, column: &str) -> String {
        if column.contains('.') {
            column.to_string()
        } else {
            format!("{}.{}", self.source(), column)
        }
    }

    /// Columns to return, defaulting to every column of the source table.
    pub fn effective_columns(&self) -> Vec<SelectColumn> {
        if self.columns.is_empty() {
            vec![SelectColumn {
                expr: format!("{}.*", self.source()),
                alias: None,
            }]
        } else {
            self.columns.clone()
        }
    }

    pub fn has_join(&self, table: &str) -> bool {
        self.joins.iter().any(|j| j.table == table)
    }
}

// ============================================================
// QueryBuilder
// ============================================================

/// Fluent query construction over an owned [`Select`].
#[derive(Clone, Default)]
pub struct QueryBuilder {
    select: Select,
    callbacks: Vec<RowCallback>,
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("select", &self.select)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

impl QueryBuilder {
    /// Start a query over `table`.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            select: Select {
                table: Some(table.into()),
                ..Select::default()
            },
            callbacks: Vec::new(),
        }
    }

    pub fn select(&self) -> &Select {
        &self.select
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.select.conditions
    }

    pub fn source_table(&self) -> Option<&str> {
        self.select.table.as_deref()
    }

    /// True when no predicate has been registered.
    pub fn is_unfiltered(&self) -> bool {
        self.select.conditions.is_empty()
    }

    fn push(&mut self, column: impl Into<String>, operator: Operator, operand: Operand) -> &mut Self {
        self.select.conditions.push(Condition::Clause(Clause {
            column: column.into(),
            operator,
            operand,
        }));
        self
    }

    // ------------------------------------------------------------------
    // Predicates
    // ------------------------------------------------------------------

    pub fn eq(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(column, Operator::Eq, Operand::Value(value.into()))
    }

    pub fn neq(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(column, Operator::Neq, Operand::Value(value.into()))
    }

    pub fn gt(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(column, Operator::Gt, Operand::Value(value.into()))
    }

    pub fn gte(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(column, Operator::Gte, Operand::Value(value.into()))
    }

    pub fn lt(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(column, Operator::Lt, Operand::Value(value.into()))
    }

    pub fn lte(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(column, Operator::Lte, Operand::Value(value.into()))
    }

    /// `column IN (values)`. An empty list matches nothing.
    pub fn in_list<I, V>(&mut self, column: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.push(column, Operator::In, Operand::List(values))
    }

    /// `column NOT IN (values)`. An empty list matches everything.
    pub fn not_in<I, V>(&mut self, column: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.push(column, Operator::NotIn, Operand::List(values))
    }

    /// Case-insensitive substring match.
    pub fn like(&mut self, column: impl Into<String>, needle: impl Into<String>) -> &mut Self {
        self.push(column, Operator::Contains, Operand::Value(Value::String(needle.into())))
    }

    /// Case-insensitive equality.
    pub fn eq_ignore_case(&mut self, column: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.push(column, Operator::EqIgnoreCase, Operand::Value(Value::String(value.into())))
    }

    pub fn is_null(&mut self, column: impl Into<String>) -> &mut Self {
        self.push(column, Operator::IsNull, Operand::Nothing)
    }

    pub fn not_null(&mut self, column: impl Into<String>) -> &mut Self {
        self.push(column, Operator::NotNull, Operand::Nothing)
    }

    /// `column IN (SELECT <first column of sub>)`.
    pub fn in_subquery(&mut self, column: impl Into<String>, sub: &QueryBuilder) -> &mut Self {
        sub.select.source();
        self.push(column, Operator::InSubquery, Operand::Select(Box::new(sub.select.clone())))
    }

    /// Predicates added inside `f` hold together (parenthesised AND).
    pub fn where_all(&mut self, f: impl FnOnce(&mut Self)) -> &mut Self {
        let children = self.collect_group(f);
        match children.len() {
            0 => {}
            1 => self.select.conditions.extend(children),
            _ => self.select.conditions.push(Condition::All(children)),
        }
        self
    }

    /// At least one predicate added inside `f` must hold (parenthesised OR).
    ///
    /// An empty group adds nothing, so a filter that ignored a malformed
    /// value does not widen or narrow the query.
    pub fn where_any(&mut self, f: impl FnOnce(&mut Self)) -> &mut Self {
        let children = self.collect_group(f);
        match children.len() {
            0 => {}
            1 => self.select.conditions.extend(children),
            _ => self.select.conditions.push(Condition::Any(children)),
        }
        self
    }

    fn collect_group(&mut self, f: impl FnOnce(&mut Self)) -> Vec<Condition> {
        let outer = std::mem::take(&mut self.select.conditions);
        f(self);
        std::mem::replace(&mut self.select.conditions, outer)
    }

    // ------------------------------------------------------------------
    // Shape
    // ------------------------------------------------------------------

    /// `LEFT JOIN table ON table.foreign_key = source_table.local_key`.
    ///
    /// An empty `source_table` means the query's own table. Joining a table
    /// that is already joined is a no-op.
    pub fn join(
        &mut self,
        table: impl Into<String>,
        foreign_key: impl Into<String>,
        local_key: impl Into<String>,
        source_table: impl Into<String>,
    ) -> &mut Self {
        let table = table.into();
        if self.select.has_join(&table) {
            return self;
        }
        let source_table = source_table.into();
        let source_table = if source_table.is_empty() {
            self.select.table.clone().unwrap_or_default()
        } else {
            source_table
        };
        self.select.joins.push(Join {
            table,
            foreign_key: foreign_key.into(),
            local_key: local_key.into(),
            source_table,
        });
        self
    }

    /// Replace the selected columns (`"tasks.*"`, `"users.name AS assignee_name"`).
    pub fn columns<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.select.columns = columns
            .into_iter()
            .map(|c| SelectColumn::parse(c.as_ref()))
            .collect();
        self
    }

    /// Expose the first column of `sub`'s first row as `alias`.
    pub fn subquery(&mut self, sub: &QueryBuilder, alias: impl Into<String>) -> &mut Self {
        sub.select.source();
        self.select.subqueries.push(SubqueryColumn {
            select: Box::new(sub.select.clone()),
            alias: alias.into(),
        });
        self
    }

    pub fn order_by(&mut self, column: impl Into<String>, direction: Direction) -> &mut Self {
        self.select.order_by.push(OrderBy {
            column: column.into(),
            direction,
        });
        self
    }

    pub fn asc(&mut self, column: impl Into<String>) -> &mut Self {
        self.order_by(column, Direction::Asc)
    }

    pub fn desc(&mut self, column: impl Into<String>) -> &mut Self {
        self.order_by(column, Direction::Desc)
    }

    pub fn limit(&mut self, limit: usize) -> &mut Self {
        self.select.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: usize) -> &mut Self {
        self.select.offset = Some(offset);
        self
    }

    /// Register a transform run over the result set after execution.
    /// Callbacks run in registration order.
    pub fn callback<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Vec<Row>) -> Vec<Row> + Send + Sync + 'static,
    {
        self.callbacks.push(Arc::new(f));
        self
    }

    /// Run registered callbacks over `rows`.
    pub fn apply_callbacks(&self, rows: Vec<Row>) -> Vec<Row> {
        self.callbacks.iter().fold(rows, |rows, cb| cb(rows))
    }

    // ------------------------------------------------------------------
    // Rendering & execution
    // ------------------------------------------------------------------

    /// Render as a parameterised SQL statement.
    pub fn to_sql(&self) -> SqlStatement {
        sql::render_select(&self.select)
    }

    /// Render the matching `COUNT(*)` statement.
    pub fn count_sql(&self) -> SqlStatement {
        sql::render_count(&self.select)
    }

    pub fn find_all(&self, executor: &dyn QueryExecutor) -> TaskboardResult<Vec<Row>> {
        self.select.source();
        let rows = executor.fetch(&self.select)?;
        Ok(self.apply_callbacks(rows))
    }

    pub fn find_one(&self, executor: &dyn QueryExecutor) -> TaskboardResult<Option<Row>> {
        self.select.source();
        let mut select = self.select.clone();
        select.limit = Some(1);
        let rows = executor.fetch(&select)?;
        Ok(self.apply_callbacks(rows).into_iter().next())
    }

    pub fn count(&self, executor: &dyn QueryExecutor) -> TaskboardResult<usize> {
        self.select.source();
        executor.count(&self.select)
    }

    /// Value of `column` in the first matching row.
    pub fn find_one_column(
        &self,
        executor: &dyn QueryExecutor,
        column: &str,
    ) -> TaskboardResult<Option<Value>> {
        self.select.source();
        let mut select = self.select.clone();
        let column = SelectColumn::parse(column);
        let key = column.output_name().to_string();
        select.columns = vec![column];
        select.subqueries.clear();
        select.limit = Some(1);
        let rows = executor.fetch(&select)?;
        Ok(rows.into_iter().next().and_then(|mut row| row.remove(&key)))
    }

    /// Execute and hand the rows to a formatter.
    pub fn format<F: crate::formatter::Formatter>(
        &self,
        executor: &dyn QueryExecutor,
        formatter: &F,
    ) -> TaskboardResult<F::Output> {
        let rows = self.find_all(executor)?;
        Ok(formatter.format(&rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fluent_chain_keeps_registration_order() {
        let mut q = QueryBuilder::table("tasks");
        q.eq("tasks.project_id", 1).gte("tasks.position", 2).like("tasks.title", "fix");

        let columns: Vec<&str> = q
            .conditions()
            .iter()
            .map(|c| match c {
                Condition::Clause(clause) => clause.column.as_str(),
                _ => "group",
            })
            .collect();
        assert_eq!(columns, ["tasks.project_id", "tasks.position", "tasks.title"]);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut base = QueryBuilder::table("tasks");
        base.eq("tasks.project_id", 1);

        let mut a = base.clone();
        let mut b = base.clone();
        a.eq("tasks.owner_id", 0);
        b.like("tasks.title", "x").asc("tasks.position");

        assert_eq!(base.conditions().len(), 1);
        assert_eq!(a.conditions().len(), 2);
        assert_eq!(b.conditions().len(), 2);
        assert!(b.select().order_by.len() == 1 && a.select().order_by.is_empty());
        assert_ne!(a.to_sql(), b.to_sql());
    }

    #[test]
    fn test_groups_collapse_when_small() {
        let mut q = QueryBuilder::table("tasks");
        q.where_any(|_| {});
        assert!(q.is_unfiltered());

        q.where_any(|q| {
            q.eq("tasks.owner_id", 1);
        });
        assert!(matches!(q.conditions()[0], Condition::Clause(_)));

        q.where_any(|q| {
            q.eq("tasks.owner_id", 2).eq("tasks.owner_id", 3);
        });
        assert!(matches!(&q.conditions()[1], Condition::Any(children) if children.len() == 2));
    }

    #[test]
    fn test_join_is_idempotent_and_defaults_source() {
        let mut q = QueryBuilder::table("tasks");
        q.join("users", "id", "owner_id", "")
            .join("users", "id", "creator_id", "");
        assert_eq!(q.select().joins.len(), 1);
        assert_eq!(q.select().joins[0].source_table, "tasks");
    }

    #[test]
    fn test_select_column_parse() {
        let col = SelectColumn::parse("users.name AS assignee_name");
        assert_eq!(col.expr, "users.name");
        assert_eq!(col.output_name(), "assignee_name");
        assert_eq!(SelectColumn::parse("tasks.title").output_name(), "title");
    }

    #[test]
    fn test_callbacks_run_in_order() {
        let mut q = QueryBuilder::table("tasks");
        q.callback(|mut rows| {
            for row in &mut rows {
                row.insert("step".into(), Value::from("first"));
            }
            rows
        })
        .callback(|mut rows| {
            for row in &mut rows {
                let prev = row["step"].as_str().unwrap_or_default().to_string();
                row.insert("step".into(), Value::from(format!("{prev}+second")));
            }
            rows
        });

        let rows = q.apply_callbacks(vec![Row::new()]);
        assert_eq!(rows[0]["step"], "first+second");
    }

    #[test]
    #[should_panic(expected = "query has no source table")]
    fn test_execution_without_source_panics() {
        let store = crate::store::MemoryStore::new();
        let q = QueryBuilder::default();
        let _ = q.find_all(&store);
    }
}
