//! Task search filters.
//!
//! Each [`Filter`] owns one or more search-token prefixes (`assignee:`,
//! `status:`) and knows how to narrow a task query for a single value.
//! Values that make no sense for a filter add no predicate at all.
//!
//! Filters expect the query to be rooted at `tasks`; the joins they need are
//! added on demand and are no-ops on [`crate::task_finder::TaskFinder`]'s
//! extended query, which already carries them.

mod date;

use chrono::Utc;

use crate::query::QueryBuilder;

pub use date::DateField;

/// A predicate unit recognising one family of search-token prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `assignee:nobody`, `assignee:me`, `assignee:3`, `assignee:"John Doe"`
    Assignee { current_user_id: Option<i64> },
    /// `status:open` or `status:closed`
    Status,
    /// `title:login`, `#42`, or any bare search term when used as default
    Title,
    Description,
    Date(DateField),
    /// `category:none` or a category name
    Category,
    Color,
    /// `swimlane:default`, swimlane id or name
    Swimlane,
    Column,
    Project,
    /// Exact external reference
    Reference,
}

impl Filter {
    /// Every filter understood by the task search, in registration order.
    pub fn all(current_user_id: Option<i64>) -> Vec<Filter> {
        vec![
            Filter::Assignee { current_user_id },
            Filter::Status,
            Filter::Title,
            Filter::Description,
            Filter::Date(DateField::Due),
            Filter::Date(DateField::Started),
            Filter::Date(DateField::Created),
            Filter::Date(DateField::Modified),
            Filter::Date(DateField::Completed),
            Filter::Category,
            Filter::Color,
            Filter::Swimlane,
            Filter::Column,
            Filter::Project,
            Filter::Reference,
        ]
    }

    pub fn prefixes(&self) -> &'static [&'static str] {
        match self {
            Filter::Assignee { .. } => &["assignee"],
            Filter::Status => &["status"],
            Filter::Title => &["title"],
            Filter::Description => &["description", "desc"],
            Filter::Date(field) => field.prefixes(),
            Filter::Category => &["category"],
            Filter::Color => &["color", "colour"],
            Filter::Swimlane => &["swimlane"],
            Filter::Column => &["column"],
            Filter::Project => &["project"],
            Filter::Reference => &["ref", "reference"],
        }
    }

    /// Whether `prefix` (without the colon) belongs to this filter.
    pub fn claims(&self, prefix: &str) -> bool {
        self.prefixes().iter().any(|p| p.eq_ignore_ascii_case(prefix))
    }

    /// Narrow `query` by one value.
    pub fn apply(&self, query: &mut QueryBuilder, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let number = value.parse::<i64>().ok();
        let lower = value.to_lowercase();

        match self {
            Filter::Assignee { current_user_id } => match (lower.as_str(), number) {
                ("nobody", _) => {
                    query.eq("tasks.owner_id", 0);
                }
                ("me", _) => {
                    if let Some(id) = current_user_id {
                        query.eq("tasks.owner_id", *id);
                    }
                }
                (_, Some(id)) => {
                    query.eq("tasks.owner_id", id);
                }
                _ => {
                    query.join("users", "id", "owner_id", "").where_any(|q| {
                        q.like("users.username", value).like("users.name", value);
                    });
                }
            },
            Filter::Status => match lower.as_str() {
                "open" => {
                    query.eq("tasks.is_active", 1);
                }
                "closed" => {
                    query.eq("tasks.is_active", 0);
                }
                _ => {}
            },
            Filter::Title => match task_id(value) {
                Some(id) => {
                    query.eq("tasks.id", id);
                }
                None => {
                    query.like("tasks.title", value);
                }
            },
            Filter::Description => {
                query.like("tasks.description", value);
            }
            Filter::Date(field) => {
                date::apply(*field, query, value, Utc::now().date_naive());
            }
            Filter::Category => match (lower.as_str(), number) {
                ("none", _) => {
                    query.eq("tasks.category_id", 0);
                }
                (_, Some(id)) => {
                    query.eq("tasks.category_id", id);
                }
                _ => {
                    query
                        .join("categories", "id", "category_id", "")
                        .eq_ignore_case("categories.name", value);
                }
            },
            Filter::Color => {
                query.eq_ignore_case("tasks.color_id", value.replace(' ', "_"));
            }
            Filter::Swimlane => match (lower.as_str(), number) {
                ("default", _) => {
                    query.eq("tasks.swimlane_id", 0);
                }
                (_, Some(id)) => {
                    query.eq("tasks.swimlane_id", id);
                }
                _ => {
                    query
                        .join("swimlanes", "id", "swimlane_id", "")
                        .eq_ignore_case("swimlanes.name", value);
                }
            },
            Filter::Column => match number {
                Some(id) => {
                    query.eq("tasks.column_id", id);
                }
                None => {
                    query
                        .join("columns", "id", "column_id", "")
                        .eq_ignore_case("columns.title", value);
                }
            },
            Filter::Project => match number {
                Some(id) => {
                    query.eq("tasks.project_id", id);
                }
                None => {
                    query
                        .join("projects", "id", "project_id", "")
                        .eq_ignore_case("projects.name", value);
                }
            },
            Filter::Reference => {
                query.eq("tasks.reference", value);
            }
        }
    }
}

/// `#123` or a run of digits names a task by id; anything else is a title.
fn task_id(value: &str) -> Option<i64> {
    let digits = value.strip_prefix('#').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::Value;
    use taskboard_common::models::{Category, Column, Task, User};

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .insert_record("users", &User::new(1, "jdoe").with_name("John Doe"))
            .unwrap();
        store.insert_record("columns", &Column::new(1, 1, "Backlog", 1)).unwrap();
        store.insert_record("columns", &Column::new(2, 1, "Work in progress", 2)).unwrap();
        store
            .insert_record("categories", &Category { id: 5, project_id: 1, name: "Bug".into() })
            .unwrap();

        let mut a = Task::new(1, 1, 1, "Fix login form");
        a.owner_id = 1;
        a.category_id = 5;
        a.reference = "GH-12".into();
        // 2026-03-10 09:00 UTC
        a.date_due = 1_773_133_200;
        let mut b = Task::new(2, 1, 2, "Write release notes");
        b.is_active = 0;
        b.color_id = "light_green".into();
        b.description = "Mention the LOGIN changes".into();
        for task in [a, b] {
            store.insert_record("tasks", &task).unwrap();
        }
        store
    }

    fn ids(filter: Filter, value: &str) -> Vec<i64> {
        let mut q = QueryBuilder::table("tasks");
        filter.apply(&mut q, value);
        q.asc("tasks.id");
        q.find_all(&store())
            .unwrap()
            .iter()
            .filter_map(|row| row.get("id").and_then(Value::as_i64))
            .collect()
    }

    #[test]
    fn test_claims_is_case_insensitive() {
        assert!(Filter::Color.claims("Colour"));
        assert!(Filter::Date(DateField::Started).claims("start"));
        assert!(!Filter::Title.claims("assignee"));
    }

    #[test]
    fn test_assignee_values() {
        let assignee = Filter::Assignee { current_user_id: Some(1) };
        assert_eq!(ids(assignee.clone(), "nobody"), vec![2]);
        assert_eq!(ids(assignee.clone(), "1"), vec![1]);
        assert_eq!(ids(assignee.clone(), "me"), vec![1]);
        assert_eq!(ids(assignee.clone(), "john d"), vec![1]);
        assert_eq!(ids(Filter::Assignee { current_user_id: None }, "me"), vec![1, 2]);
    }

    #[test]
    fn test_status_and_unknown_values() {
        assert_eq!(ids(Filter::Status, "open"), vec![1]);
        assert_eq!(ids(Filter::Status, "CLOSED"), vec![2]);
        assert_eq!(ids(Filter::Status, "archived"), vec![1, 2]);
        assert_eq!(ids(Filter::Status, "  "), vec![1, 2]);
    }

    #[test]
    fn test_title_and_description() {
        assert_eq!(ids(Filter::Title, "#2"), vec![2]);
        assert_eq!(ids(Filter::Title, "2"), vec![2]);
        assert!(ids(Filter::Title, "+2").is_empty());
        assert!(ids(Filter::Title, "-2").is_empty());
        assert!(ids(Filter::Title, "#").is_empty());
        assert_eq!(ids(Filter::Title, "LOGIN"), vec![1]);
        assert_eq!(ids(Filter::Description, "login"), vec![2]);
    }

    #[test]
    fn test_dates_match_rows() {
        let due = Filter::Date(DateField::Due);
        assert_eq!(ids(due.clone(), "2026-03-10"), vec![1]);
        assert_eq!(ids(due.clone(), "<=2026-03-10"), vec![1]);
        assert!(ids(due.clone(), "<2026-03-10").is_empty());
        assert!(ids(due.clone(), ">2026-03-10").is_empty());
        assert_eq!(ids(due.clone(), "<=today"), vec![1]);
        assert_eq!(ids(due, "whenever"), vec![1, 2]);
        assert!(ids(Filter::Date(DateField::Started), ">=2000-01-01").is_empty());
    }

    #[test]
    fn test_board_dimensions() {
        assert_eq!(ids(Filter::Category, "none"), vec![2]);
        assert_eq!(ids(Filter::Category, "bug"), vec![1]);
        assert_eq!(ids(Filter::Color, "Light Green"), vec![2]);
        assert_eq!(ids(Filter::Column, "work in progress"), vec![2]);
        assert_eq!(ids(Filter::Column, "1"), vec![1]);
        assert_eq!(ids(Filter::Swimlane, "default"), vec![1, 2]);
        assert_eq!(ids(Filter::Reference, "GH-12"), vec![1]);
    }
}
