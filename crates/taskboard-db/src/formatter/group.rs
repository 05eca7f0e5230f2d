use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use taskboard_common::config::BoardConfig;
use taskboard_common::error::{TaskboardError, TaskboardResult};

use super::{int, text, Formatter};
use crate::query::{value_to_text, Row};

/// Attribute tasks are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Column,
    Swimlane,
    Assignee,
    Category,
    Project,
    Color,
}

impl Dimension {
    fn key(self, row: &Row) -> Value {
        match self {
            Self::Color => row.get("color_id").cloned().unwrap_or(Value::Null),
            other => Value::from(int(row, other.id_column())),
        }
    }

    fn id_column(self) -> &'static str {
        match self {
            Self::Column => "column_id",
            Self::Swimlane => "swimlane_id",
            Self::Assignee => "owner_id",
            Self::Category => "category_id",
            Self::Project => "project_id",
            Self::Color => "color_id",
        }
    }

    fn label(self, row: &Row) -> String {
        let label = match self {
            Self::Column => text(row, "column_name"),
            Self::Swimlane => text(row, "swimlane_name")
                .or_else(|| (int(row, "swimlane_id") == 0).then_some("Default swimlane")),
            Self::Assignee => text(row, "assignee_name")
                .or_else(|| text(row, "assignee_username"))
                .or(Some("Unassigned")),
            Self::Category => text(row, "category_name").or(Some("No category")),
            Self::Project => text(row, "project_name"),
            Self::Color => text(row, "color_id"),
        };
        match label {
            Some(label) => label.to_string(),
            None => value_to_text(&self.key(row)),
        }
    }
}

impl FromStr for Dimension {
    type Err = TaskboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "column" => Ok(Self::Column),
            "swimlane" => Ok(Self::Swimlane),
            "assignee" => Ok(Self::Assignee),
            "category" => Ok(Self::Category),
            "project" => Ok(Self::Project),
            "color" => Ok(Self::Color),
            other => Err(TaskboardError::validation(format!("Unknown grouping: {other}"))),
        }
    }
}

/// One bucket of tasks sharing a [`Dimension`] value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskGroup {
    pub key: Value,
    pub label: String,
    pub tasks: Vec<Row>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subgroups: Vec<TaskGroup>,
}

/// Groups rows by a primary and an optional secondary dimension.
///
/// Groups appear in order of first appearance in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFormatter {
    primary: Dimension,
    secondary: Option<Dimension>,
}

impl Default for GroupFormatter {
    /// Columns split by swimlane, the board layout.
    fn default() -> Self {
        Self::new(Dimension::Column).then_by(Dimension::Swimlane)
    }
}

impl GroupFormatter {
    pub fn new(primary: Dimension) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    pub fn then_by(mut self, secondary: Dimension) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Formatter for the configured list grouping. Column groupings keep
    /// the swimlane split of the board.
    pub fn from_config(config: &BoardConfig) -> TaskboardResult<Self> {
        Ok(match config.default_grouping.parse()? {
            Dimension::Column => Self::default(),
            other => Self::new(other),
        })
    }

    fn group(dimension: Dimension, rows: &[Row]) -> Vec<TaskGroup> {
        let mut groups: Vec<TaskGroup> = Vec::new();
        for row in rows {
            let key = dimension.key(row);
            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => group.tasks.push(row.clone()),
                None => groups.push(TaskGroup {
                    key,
                    label: dimension.label(row),
                    tasks: vec![row.clone()],
                    subgroups: Vec::new(),
                }),
            }
        }
        groups
    }
}

impl Formatter for GroupFormatter {
    type Output = Vec<TaskGroup>;

    fn format(&self, rows: &[Row]) -> Vec<TaskGroup> {
        let mut groups = Self::group(self.primary, rows);
        if let Some(secondary) = self.secondary {
            for group in &mut groups {
                group.subgroups = Self::group(secondary, &group.tasks);
            }
        }
        groups
    }
}
