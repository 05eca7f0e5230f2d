//! Search expression lexer and the builder that turns it into a query.
//!
//! ```text
//! assignee:nobody assignee:me status:open "login form" due:<=today
//! ```
//!
//! Tokens sharing a filter are alternatives (OR); different filters narrow
//! each other (AND). Bare terms and unknown prefixes are handed, joined by
//! spaces, to the default filter.

use taskboard_common::config::SearchConfig;
use tracing::debug;

use crate::filter::Filter;
use crate::query::QueryBuilder;
use crate::task_finder::TaskFinder;

/// One lexical unit of a search expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Free text
    Term(String),
    /// `prefix:value`, with quotes around the value removed
    Prefixed { prefix: String, value: String },
}

pub struct Lexer;

impl Lexer {
    /// Split `input` into tokens.
    ///
    /// Whitespace separates tokens except inside double quotes. A quote left
    /// open runs to the end of the input.
    pub fn tokenize(input: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut buf = String::new();
        let mut in_quotes = false;
        let mut started_quoted = false;
        let mut colon_at: Option<usize> = None;
        let mut touched = false;

        let mut flush = |buf: &mut String,
                         colon_at: &mut Option<usize>,
                         started_quoted: &mut bool,
                         touched: &mut bool| {
            if *touched {
                let token = match colon_at.take() {
                    Some(idx) if !*started_quoted && idx > 0 => Token::Prefixed {
                        prefix: buf[..idx].to_string(),
                        value: buf[idx + 1..].to_string(),
                    },
                    _ => Token::Term(buf.clone()),
                };
                if !matches!(&token, Token::Term(text) if text.is_empty()) {
                    tokens.push(token);
                }
            }
            buf.clear();
            *colon_at = None;
            *started_quoted = false;
            *touched = false;
        };

        for c in input.chars() {
            match c {
                '"' => {
                    if !touched {
                        started_quoted = true;
                    }
                    in_quotes = !in_quotes;
                    touched = true;
                }
                c if c.is_whitespace() && !in_quotes => {
                    flush(&mut buf, &mut colon_at, &mut started_quoted, &mut touched);
                }
                ':' if !in_quotes && colon_at.is_none() => {
                    colon_at = Some(buf.len());
                    buf.push(c);
                    touched = true;
                }
                c => {
                    buf.push(c);
                    touched = true;
                }
            }
        }
        flush(&mut buf, &mut colon_at, &mut started_quoted, &mut touched);

        tokens
    }
}

/// Dispatches search tokens to registered filters over a base query.
///
/// Cloning yields an independent builder: filters are plain values and the
/// base query is deep-copied.
#[derive(Debug, Clone, Default)]
pub struct LexerBuilder {
    filters: Vec<Filter>,
    default_filter: Option<usize>,
    query: Option<QueryBuilder>,
}

impl LexerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with every task filter registered, `title` as default,
    /// seeded with [`TaskFinder::extended_query`].
    pub fn for_tasks(current_user_id: Option<i64>) -> Self {
        let mut builder = Self::new().with_query(TaskFinder::extended_query());
        for filter in Filter::all(current_user_id) {
            let is_default = filter == Filter::Title;
            builder = builder.with_filter(filter, is_default);
        }
        builder
    }

    /// Register a filter. The last filter registered with `is_default`
    /// receives bare terms.
    pub fn with_filter(mut self, filter: Filter, is_default: bool) -> Self {
        self.filters.push(filter);
        if is_default {
            self.default_filter = Some(self.filters.len() - 1);
        }
        self
    }

    /// Base query the filters narrow.
    pub fn with_query(mut self, query: QueryBuilder) -> Self {
        self.query = Some(query);
        self
    }

    fn filter_for(&self, prefix: &str) -> Option<usize> {
        self.filters.iter().position(|f| f.claims(prefix))
    }

    /// Parse `search` and return a narrowed copy of the base query.
    ///
    /// Nothing is executed; the builder itself is left unchanged.
    pub fn build(&self, search: &str) -> QueryBuilder {
        let mut query = self.query.clone().unwrap_or_default();
        let tokens = Lexer::tokenize(search);

        let mut groups: Vec<Vec<String>> = vec![Vec::new(); self.filters.len()];
        let mut terms: Vec<String> = Vec::new();

        for token in &tokens {
            match token {
                Token::Prefixed { prefix, value } => match self.filter_for(prefix) {
                    Some(idx) => groups[idx].push(value.clone()),
                    None => terms.push(format!("{prefix}:{value}")),
                },
                Token::Term(text) => terms.push(text.clone()),
            }
        }

        if !terms.is_empty() {
            match self.default_filter {
                Some(idx) => groups[idx].push(terms.join(" ")),
                None => debug!(terms = terms.len(), "no default filter, dropping bare terms"),
            }
        }

        for (filter, values) in self.filters.iter().zip(&groups) {
            if values.is_empty() {
                continue;
            }
            query.where_any(|q| {
                for value in values {
                    q.where_all(|q| filter.apply(q, value));
                }
            });
        }

        debug!(tokens = tokens.len(), search, "built search query");
        query
    }

    /// [`build`](Self::build) with the configured fallback expression for a
    /// blank search, capped at the configured result count.
    pub fn build_search(&self, search: &str, config: &SearchConfig) -> QueryBuilder {
        let search = match search.trim() {
            "" => config.default_query.as_str(),
            _ => search,
        };
        let mut query = self.build(search);
        query.limit(config.max_results as usize);
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Row;
    use crate::store::MemoryStore;
    use serde_json::Value;
    use taskboard_common::models::{Project, Task};

    fn term(text: &str) -> Token {
        Token::Term(text.into())
    }

    fn prefixed(prefix: &str, value: &str) -> Token {
        Token::Prefixed {
            prefix: prefix.into(),
            value: value.into(),
        }
    }

    fn store(tasks: &[Task]) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_record("projects", &Project::new(1, "Project")).unwrap();
        for task in tasks {
            store.insert_record("tasks", task).unwrap();
        }
        store
    }

    fn builder() -> LexerBuilder {
        LexerBuilder::new()
            .with_filter(Filter::Assignee { current_user_id: None }, false)
            .with_filter(Filter::Title, true)
            .with_query(TaskFinder::extended_query())
    }

    fn titles(rows: &[Row]) -> Vec<&str> {
        let mut titles: Vec<&str> = rows
            .iter()
            .filter_map(|r| r.get("title").and_then(Value::as_str))
            .collect();
        titles.sort();
        titles
    }

    #[test]
    fn test_tokenize_quotes_and_prefixes() {
        assert_eq!(
            Lexer::tokenize(r#"assignee:"John Doe" "login form"  fix status:open"#),
            vec![
                prefixed("assignee", "John Doe"),
                term("login form"),
                term("fix"),
                prefixed("status", "open"),
            ]
        );
        assert_eq!(Lexer::tokenize("   "), vec![]);
        assert_eq!(Lexer::tokenize(r#"title:"never closed"#), vec![prefixed("title", "never closed")]);
        assert_eq!(Lexer::tokenize(":x http://a"), vec![term(":x"), prefixed("http", "//a")]);
    }

    #[test]
    fn test_assignee_nobody_returns_unowned_task() {
        let store = store(&[Task::new(1, 1, 1, "Test")]);
        let rows = builder().build("assignee:nobody").find_all(&store).unwrap();
        assert_eq!(titles(&rows), ["Test"]);
    }

    #[test]
    fn test_unmatched_default_term_returns_nothing() {
        let store = store(&[Task::new(1, 1, 1, "Test")]);
        let rows = builder().build("something").find_all(&store).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_empty_search_is_unfiltered() {
        let store = store(&[Task::new(1, 1, 1, "Test")]);
        let query = builder().build("");
        assert_eq!(query.conditions(), TaskFinder::extended_query().conditions());
        assert_eq!(query.count(&store).unwrap(), 1);
    }

    #[test]
    fn test_same_prefix_is_a_union() {
        let mut owned = Task::new(1, 1, 1, "ABC");
        owned.owner_id = 1;
        let store = store(&[owned, Task::new(2, 1, 1, "DEF")]);

        let rows = builder().build("assignee:1").find_all(&store).unwrap();
        assert_eq!(titles(&rows), ["ABC"]);

        let rows = builder()
            .build("assignee:nobody assignee:1")
            .find_all(&store)
            .unwrap();
        assert_eq!(titles(&rows), ["ABC", "DEF"]);

        let rows = builder()
            .build("assignee:nobody assignee:1 abc")
            .find_all(&store)
            .unwrap();
        assert_eq!(titles(&rows), ["ABC"]);
    }

    #[test]
    fn test_bare_terms_and_unknown_prefixes_join_default_value() {
        let store = store(&[Task::new(1, 1, 1, "Deploy to prod:eu today")]);
        let rows = builder().build("to prod:eu").find_all(&store).unwrap();
        assert_eq!(rows.len(), 1);
        let rows = builder().build("prod:eu to").find_all(&store).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_clones_are_independent() {
        let builder = builder();
        let clone = builder.clone();
        let a = builder.build("test");
        let b = clone.build("assignee:nobody");
        assert_ne!(a.to_sql(), b.to_sql());
        assert_eq!(builder.build("test").to_sql(), a.to_sql());
    }

    #[test]
    fn test_builder_without_default_drops_terms() {
        let builder = LexerBuilder::new()
            .with_filter(Filter::Status, false)
            .with_query(QueryBuilder::table("tasks"));
        assert!(builder.build("loose words").is_unfiltered());
    }

    #[test]
    fn test_task_lexer_registers_everything() {
        let store = store(&[Task::new(1, 1, 1, "Test"), {
            let mut closed = Task::new(2, 1, 1, "Old test");
            closed.is_active = 0;
            closed
        }]);
        let rows = LexerBuilder::for_tasks(Some(3))
            .build("status:open project:project test")
            .find_all(&store)
            .unwrap();
        assert_eq!(titles(&rows), ["Test"]);
    }

    #[test]
    fn test_blank_search_uses_configured_default() {
        let store = store(&[
            Task::new(1, 1, 1, "One"),
            Task::new(2, 1, 1, "Two"),
            {
                let mut closed = Task::new(3, 1, 1, "Three");
                closed.is_active = 0;
                closed
            },
        ]);
        let config = SearchConfig {
            max_results: 1,
            default_query: "status:open".into(),
        };
        let builder = LexerBuilder::for_tasks(None);

        let query = builder.build_search("  ", &config);
        assert_eq!(query.count(&store).unwrap(), 2);
        assert_eq!(query.find_all(&store).unwrap().len(), 1);

        let query = builder.build_search("three", &config);
        assert_eq!(titles(&query.find_all(&store).unwrap()), ["Three"]);
    }
}
