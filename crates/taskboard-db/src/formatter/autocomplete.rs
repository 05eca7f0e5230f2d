use serde::Serialize;

use super::{int, Formatter};
use crate::query::Row;

/// Suggestion entry for task pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoCompleteItem {
    pub id: i64,
    pub value: String,
    pub label: String,
}

/// Formats task rows as `#id - title` suggestions.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoCompleteFormatter;

impl Formatter for AutoCompleteFormatter {
    type Output = Vec<AutoCompleteItem>;

    fn format(&self, rows: &[Row]) -> Vec<AutoCompleteItem> {
        rows.iter()
            .map(|row| {
                let id = int(row, "id");
                let title = row
                    .get("title")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                AutoCompleteItem {
                    id,
                    label: format!("#{id} - {title}"),
                    value: title,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::LexerBuilder;
    use crate::store::MemoryStore;
    use taskboard_common::models::Task;

    #[test]
    fn test_autocomplete_from_search() {
        let mut store = MemoryStore::new();
        store.insert_record("tasks", &Task::new(12, 1, 1, "Fix login")).unwrap();
        store.insert_record("tasks", &Task::new(13, 1, 1, "Write docs")).unwrap();

        let items = LexerBuilder::for_tasks(None)
            .build("login")
            .format(&store, &AutoCompleteFormatter)
            .unwrap();
        assert_eq!(
            items,
            vec![AutoCompleteItem {
                id: 12,
                value: "Fix login".into(),
                label: "#12 - Fix login".into(),
            }]
        );
    }
}
