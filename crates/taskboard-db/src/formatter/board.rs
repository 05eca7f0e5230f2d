use serde::Serialize;
use taskboard_common::models::{Column, Project, Swimlane};

use super::{int, Formatter};
use crate::query::Row;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardColumn {
    pub id: i64,
    pub title: String,
    pub position: i64,
    pub task_limit: u32,
    pub nb_tasks: usize,
    /// Sum of task scores
    pub score: i64,
    pub tasks: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardSwimlane {
    pub id: i64,
    pub name: String,
    pub nb_tasks: usize,
    pub columns: Vec<BoardColumn>,
}

/// Lays task rows out as swimlanes × columns.
///
/// Every active swimlane gets every column, so empty cells are present.
/// Rows pointing at an unknown swimlane or column are left out.
#[derive(Debug, Clone)]
pub struct BoardFormatter {
    swimlanes: Vec<Swimlane>,
    columns: Vec<Column>,
}

impl BoardFormatter {
    pub fn new(mut swimlanes: Vec<Swimlane>, mut columns: Vec<Column>) -> Self {
        swimlanes.retain(|s| s.is_active);
        swimlanes.sort_by_key(|s| (s.position, s.id));
        columns.sort_by_key(|c| (c.position, c.id));
        Self { swimlanes, columns }
    }

    /// Board of `project`, with its default swimlane placed first.
    pub fn for_project(project: &Project, mut swimlanes: Vec<Swimlane>, columns: Vec<Column>) -> Self {
        if !swimlanes.iter().any(|s| s.id == Swimlane::DEFAULT_ID) {
            swimlanes.push(Swimlane::new(
                Swimlane::DEFAULT_ID,
                project.id,
                project.default_swimlane.clone(),
                0,
            ));
        }
        Self::new(swimlanes, columns)
    }
}

impl Formatter for BoardFormatter {
    type Output = Vec<BoardSwimlane>;

    fn format(&self, rows: &[Row]) -> Vec<BoardSwimlane> {
        let mut board: Vec<BoardSwimlane> = self
            .swimlanes
            .iter()
            .map(|swimlane| BoardSwimlane {
                id: swimlane.id,
                name: swimlane.name.clone(),
                nb_tasks: 0,
                columns: self
                    .columns
                    .iter()
                    .map(|column| BoardColumn {
                        id: column.id,
                        title: column.title.clone(),
                        position: column.position,
                        task_limit: column.task_limit,
                        nb_tasks: 0,
                        score: 0,
                        tasks: Vec::new(),
                    })
                    .collect(),
            })
            .collect();

        for row in rows {
            let swimlane_id = int(row, "swimlane_id");
            let column_id = int(row, "column_id");
            let Some(lane) = board.iter_mut().find(|s| s.id == swimlane_id) else {
                continue;
            };
            let Some(cell) = lane.columns.iter_mut().find(|c| c.id == column_id) else {
                continue;
            };
            cell.nb_tasks += 1;
            cell.score += int(row, "score");
            cell.tasks.push(row.clone());
            lane.nb_tasks += 1;
        }

        board
    }
}
