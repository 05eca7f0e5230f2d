//! Base task queries the search and board views start from.

use std::collections::BTreeSet;

use crate::query::QueryBuilder;

pub struct TaskFinder;

impl TaskFinder {
    /// Tasks joined with their assignee, category, column, swimlane and
    /// project, exposing the display names those views need.
    pub fn extended_query() -> QueryBuilder {
        let mut query = QueryBuilder::table("tasks");
        query
            .columns([
                "tasks.*",
                "users.username AS assignee_username",
                "users.name AS assignee_name",
                "categories.name AS category_name",
                "columns.title AS column_name",
                "columns.position AS column_position",
                "swimlanes.name AS swimlane_name",
                "projects.name AS project_name",
            ])
            .join("users", "id", "owner_id", "")
            .join("categories", "id", "category_id", "")
            .join("columns", "id", "column_id", "")
            .join("swimlanes", "id", "swimlane_id", "")
            .join("projects", "id", "project_id", "");
        query
    }

    /// Extended query restricted to one project, in board order.
    pub fn project_query(project_id: i64) -> QueryBuilder {
        let mut query = Self::extended_query();
        query
            .eq("tasks.project_id", project_id)
            .asc("tasks.position")
            .asc("tasks.id");
        query
    }

    /// Extended query restricted to the projects a user may see.
    ///
    /// An empty set matches no task.
    pub fn visible_query(project_ids: &BTreeSet<i64>) -> QueryBuilder {
        let mut query = Self::extended_query();
        query
            .in_list("tasks.project_id", project_ids.iter().copied())
            .desc("tasks.id");
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;
    use taskboard_common::models::{Column, Project, Swimlane, Task, User};

    #[test]
    fn test_extended_query_exposes_display_names() {
        let mut store = MemoryStore::new();
        store.insert_record("projects", &Project::new(1, "Website")).unwrap();
        store.insert_record("columns", &Column::new(4, 1, "Done", 4)).unwrap();
        store.insert_record("swimlanes", &Swimlane::new(2, 1, "Ops", 1)).unwrap();
        store.insert_record("users", &User::new(9, "bob")).unwrap();
        let mut task = Task::new(1, 1, 4, "Ship it");
        task.owner_id = 9;
        task.swimlane_id = 2;
        store.insert_record("tasks", &task).unwrap();
        store.insert_record("tasks", &Task::new(2, 2, 1, "Elsewhere")).unwrap();

        let rows = TaskFinder::project_query(1).find_all(&store).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row["title"], json!("Ship it"));
        assert_eq!(row["assignee_username"], json!("bob"));
        assert_eq!(row["column_name"], json!("Done"));
        assert_eq!(row["swimlane_name"], json!("Ops"));
        assert_eq!(row["project_name"], json!("Website"));
        assert_eq!(row["category_name"], serde_json::Value::Null);
    }

    #[test]
    fn test_visible_query_with_no_projects_is_empty() {
        let mut store = MemoryStore::new();
        store.insert_record("tasks", &Task::new(1, 1, 1, "Hidden")).unwrap();
        let query = TaskFinder::visible_query(&BTreeSet::new());
        assert_eq!(query.count(&store).unwrap(), 0);
        assert_eq!(
            TaskFinder::visible_query(&BTreeSet::from([1])).count(&store).unwrap(),
            1
        );
    }
}
