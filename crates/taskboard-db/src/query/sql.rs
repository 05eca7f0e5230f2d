//! SQL rendering of a [`Select`].
//!
//! Output uses `?` placeholders (SQLite through `sqlx::AnyPool`), quoted
//! identifiers, `LEFT JOIN` for every join and parenthesised groups. Clauses
//! are emitted in registration order.

use serde_json::Value;

use super::{Clause, Condition, Direction, Operand, Operator, Select, SelectColumn};

/// A rendered statement with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

fn quote_ident(expr: &str) -> String {
    expr.split('.')
        .map(|part| {
            if part == "*" {
                part.to_string()
            } else {
                format!("\"{}\"", part.replace('"', "\"\""))
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

struct Renderer<'a> {
    select: &'a Select,
    params: Vec<Value>,
}

impl<'a> Renderer<'a> {
    fn new(select: &'a Select) -> Self {
        Self {
            select,
            params: Vec::new(),
        }
    }

    fn column(&self, column: &str) -> String {
        quote_ident(&self.select.qualify(column))
    }

    fn select_column(&self, column: &SelectColumn) -> String {
        match &column.alias {
            Some(alias) => format!("{} AS {}", quote_ident(&column.expr), quote_ident(alias)),
            None => quote_ident(&column.expr),
        }
    }

    fn nested(&mut self, select: &Select) -> String {
        let statement = render_select(select);
        self.params.extend(statement.params);
        statement.sql
    }

    fn clause(&mut self, clause: &Clause) -> String {
        let column = self.column(&clause.column);
        let binary = |op: &str, value: &Value, params: &mut Vec<Value>| {
            params.push(value.clone());
            format!("{column} {op} ?")
        };

        match (&clause.operator, &clause.operand) {
            (Operator::IsNull, _) => format!("{column} IS NULL"),
            (Operator::NotNull, _) => format!("{column} IS NOT NULL"),
            (Operator::Eq, Operand::Value(v)) => binary("=", v, &mut self.params),
            (Operator::Neq, Operand::Value(v)) => binary("!=", v, &mut self.params),
            (Operator::Gt, Operand::Value(v)) => binary(">", v, &mut self.params),
            (Operator::Gte, Operand::Value(v)) => binary(">=", v, &mut self.params),
            (Operator::Lt, Operand::Value(v)) => binary("<", v, &mut self.params),
            (Operator::Lte, Operand::Value(v)) => binary("<=", v, &mut self.params),
            (Operator::In, Operand::List(values)) if values.is_empty() => "1 = 0".to_string(),
            (Operator::NotIn, Operand::List(values)) if values.is_empty() => "1 = 1".to_string(),
            (Operator::In | Operator::NotIn, Operand::List(values)) => {
                self.params.extend(values.iter().cloned());
                let marks = vec!["?"; values.len()].join(", ");
                let op = if clause.operator == Operator::In { "IN" } else { "NOT IN" };
                format!("{column} {op} ({marks})")
            }
            (Operator::Contains, Operand::Value(v)) => {
                let needle = escape_like(&super::value_to_text(v));
                self.params.push(Value::String(format!("%{needle}%")));
                format!("LOWER({column}) LIKE LOWER(?) ESCAPE '\\'")
            }
            // The database folds both sides.
            (Operator::EqIgnoreCase, Operand::Value(v)) => {
                self.params.push(Value::String(super::value_to_text(v)));
                format!("LOWER({column}) = LOWER(?)")
            }
            (Operator::InSubquery, Operand::Select(sub)) => {
                let sql = self.nested(sub);
                format!("{column} IN ({sql})")
            }
            (Operator::InSubquery, Operand::List(values)) if values.is_empty() => "1 = 0".to_string(),
            (Operator::InSubquery, Operand::List(values)) => {
                self.params.extend(values.iter().cloned());
                let marks = vec!["?"; values.len()].join(", ");
                format!("{column} IN ({marks})")
            }
            (operator, operand) => {
                panic!("operator {operator:?} cannot take operand {operand:?}")
            }
        }
    }

    fn condition(&mut self, condition: &Condition) -> String {
        match condition {
            Condition::Clause(clause) => self.clause(clause),
            Condition::All(children) => self.group(children, " AND "),
            Condition::Any(children) => self.group(children, " OR "),
        }
    }

    fn group(&mut self, children: &[Condition], glue: &str) -> String {
        let parts: Vec<String> = children.iter().map(|c| self.condition(c)).collect();
        format!("({})", parts.join(glue))
    }

    fn from_and_where(&mut self, sql: &mut String) {
        let select = self.select;
        sql.push_str(" FROM ");
        sql.push_str(&quote_ident(select.source()));

        for join in &select.joins {
            sql.push_str(&format!(
                " LEFT JOIN {table} ON {table}.{fk} = {source}.{lk}",
                table = quote_ident(&join.table),
                fk = quote_ident(&join.foreign_key),
                source = quote_ident(&join.source_table),
                lk = quote_ident(&join.local_key),
            ));
        }

        if !select.conditions.is_empty() {
            let parts: Vec<String> = select
                .conditions
                .iter()
                .map(|c| self.condition(c))
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&parts.join(" AND "));
        }
    }
}

/// Render a full `SELECT`.
pub fn render_select(select: &Select) -> SqlStatement {
    let mut r = Renderer::new(select);

    let mut columns: Vec<String> = select
        .effective_columns()
        .iter()
        .map(|c| r.select_column(c))
        .collect();
    for sub in &select.subqueries {
        let sql = r.nested(&sub.select);
        columns.push(format!("({sql}) AS {}", quote_ident(&sub.alias)));
    }

    let mut sql = format!("SELECT {}", columns.join(", "));
    r.from_and_where(&mut sql);

    if !select.order_by.is_empty() {
        let order: Vec<String> = select
            .order_by
            .iter()
            .map(|o| {
                let dir = match o.direction {
                    Direction::Asc => "ASC",
                    Direction::Desc => "DESC",
                };
                format!("{} {dir}", r.column(&o.column))
            })
            .collect();
        sql.push_str(" ORDER BY ");
        sql.push_str(&order.join(", "));
    }

    match (select.limit, select.offset) {
        (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
        (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
        (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
        (None, None) => {}
    }

    SqlStatement { sql, params: r.params }
}

/// Render `SELECT COUNT(*)` over the same source, joins and conditions.
pub fn render_count(select: &Select) -> SqlStatement {
    let mut r = Renderer::new(select);
    let mut sql = "SELECT COUNT(*) AS \"count\"".to_string();
    r.from_and_where(&mut sql);
    SqlStatement { sql, params: r.params }
}
