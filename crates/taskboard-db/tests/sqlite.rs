//! End-to-end checks against an in-memory SQLite database.

use serde_json::Value;
use sqlx::any::AnyPoolOptions;
use taskboard_common::models::{ProjectStatus, Task};
use taskboard_common::roles::{ApplicationRole, ProjectRole};
use taskboard_db::formatter::{BoardFormatter, GroupFormatter, Dimension};
use taskboard_db::repository::{access, board, groups, project_group_roles, project_user_roles, projects, tasks, users};
use taskboard_db::{Database, LexerBuilder, MemoryStore, PermissionModel, Row, TaskFinder};

async fn database() -> Database {
    sqlx::any::install_default_drivers();
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect to sqlite");
    let db = Database { pool };
    db.migrate().await.expect("run migrations");
    db
}

fn titles(rows: &[Row]) -> Vec<String> {
    let mut titles: Vec<String> = rows
        .iter()
        .filter_map(|r| r.get("title").and_then(Value::as_str).map(str::to_string))
        .collect();
    titles.sort();
    titles
}

// 2026-03-10 00:00:00 UTC
const MARCH_10: i64 = 1_773_100_800;
// 2100-01-01 00:00:00 UTC
const NEXT_CENTURY: i64 = 4_102_444_800;

#[tokio::test]
async fn search_matches_memory_store() {
    let db = database().await;
    let pool = &db.pool;

    let user = users::create_user(pool, "jdoe", "John Doe", None, ApplicationRole::User)
        .await
        .unwrap();
    let project = projects::create_project(pool, "Project", false).await.unwrap();
    let column = board::create_column(pool, project.id, "Backlog", 1).await.unwrap();
    let support = board::create_swimlane(pool, project.id, "Support", 1).await.unwrap();
    let bug = board::create_category(pool, project.id, "Bug").await.unwrap();

    let mut owned = Task::new(0, project.id, column.id, "ABC");
    owned.owner_id = user.id;
    owned.category_id = bug.id;
    owned.date_due = MARCH_10 + 3_600;

    let mut unowned = Task::new(0, project.id, column.id, "DEF");
    unowned.swimlane_id = support.id;
    unowned.date_started = MARCH_10 + 12 * 3_600;
    unowned.date_due = NEXT_CENTURY;

    let translated = Task::new(0, project.id, column.id, "Übersetzung prüfen");

    let mut store = MemoryStore::new();
    store.insert_record("users", &user).unwrap();
    store.insert_record("projects", &project).unwrap();
    store.insert_record("columns", &column).unwrap();
    store.insert_record("swimlanes", &support).unwrap();
    store.insert_record("categories", &bug).unwrap();
    for task in [owned, unowned, translated] {
        let created = tasks::create_task(pool, &task).await.unwrap();
        store.insert_record("tasks", &created).unwrap();
    }

    let builder = LexerBuilder::for_tasks(Some(user.id));
    let expected: Vec<(String, Vec<&str>)> = vec![
        (String::new(), vec!["ABC", "DEF", "Übersetzung prüfen"]),
        ("assignee:nobody".into(), vec!["DEF", "Übersetzung prüfen"]),
        (format!("assignee:{}", user.id), vec!["ABC"]),
        ("assignee:nobody assignee:me".into(), vec!["ABC", "DEF", "Übersetzung prüfen"]),
        ("assignee:\"john doe\"".into(), vec!["ABC"]),
        ("something".into(), vec![]),
        ("abc".into(), vec!["ABC"]),
        ("#1".into(), vec!["ABC"]),
        ("column:backlog status:open".into(), vec!["ABC", "DEF", "Übersetzung prüfen"]),
        ("Übersetzung".into(), vec!["Übersetzung prüfen"]),
        ("Übersetzung PRüFEN".into(), vec!["Übersetzung prüfen"]),
        ("übersetzung".into(), vec![]),
        ("category:bug".into(), vec!["ABC"]),
        ("category:none".into(), vec!["DEF", "Übersetzung prüfen"]),
        ("swimlane:SUPPORT".into(), vec!["DEF"]),
        ("swimlane:default".into(), vec!["ABC", "Übersetzung prüfen"]),
        ("project:project".into(), vec!["ABC", "DEF", "Übersetzung prüfen"]),
        ("project:elsewhere".into(), vec![]),
        ("due:<=today".into(), vec!["ABC"]),
        ("due:2026-03-10".into(), vec!["ABC"]),
        ("due:>today".into(), vec!["DEF"]),
        ("started:2026-03-10".into(), vec!["DEF"]),
        ("start:<2026-03-10".into(), vec![]),
    ];

    for (search, titles_expected) in &expected {
        let query = builder.build(search);
        let from_sql = tasks::find_all(pool, &query).await.unwrap();
        let from_memory = query.find_all(&store).unwrap();
        assert_eq!(titles(&from_sql), *titles_expected, "sql {search:?}");
        assert_eq!(titles(&from_memory), *titles_expected, "memory {search:?}");
        assert_eq!(
            tasks::count(pool, &query).await.unwrap(),
            query.count(&store).unwrap(),
            "count {search:?}"
        );
    }

    let rows = tasks::find_all(pool, &builder.build("assignee:me")).await.unwrap();
    assert_eq!(titles(&rows), ["ABC"]);
    assert_eq!(rows[0]["assignee_username"], Value::from("jdoe"));
    assert_eq!(rows[0]["column_name"], Value::from("Backlog"));
    assert_eq!(rows[0]["category_name"], Value::from("Bug"));
}

#[tokio::test]
async fn board_and_groups_over_sql() {
    let db = database().await;
    let pool = &db.pool;

    let project = projects::create_project(pool, "Roadmap", false).await.unwrap();
    let todo = board::create_column(pool, project.id, "Todo", 1).await.unwrap();
    let done = board::create_column(pool, project.id, "Done", 2).await.unwrap();
    let lane = board::create_swimlane(pool, project.id, "Support", 1).await.unwrap();

    for (title, column_id, swimlane_id) in [("a", todo.id, 0), ("b", done.id, lane.id), ("c", todo.id, 0)] {
        let mut task = Task::new(0, project.id, column_id, title);
        task.swimlane_id = swimlane_id;
        tasks::create_task(pool, &task).await.unwrap();
    }

    let formatter = BoardFormatter::for_project(
        &project,
        board::list_swimlanes(pool, project.id).await.unwrap(),
        board::list_columns(pool, project.id).await.unwrap(),
    );
    let layout = tasks::format(pool, &TaskFinder::project_query(project.id), &formatter)
        .await
        .unwrap();
    assert_eq!(layout.len(), 2);
    assert_eq!(layout[0].columns[0].nb_tasks, 2);
    assert_eq!(layout[1].columns[1].nb_tasks, 1);

    let grouped = tasks::format(
        pool,
        &TaskFinder::project_query(project.id),
        &GroupFormatter::new(Dimension::Column),
    )
    .await
    .unwrap();
    assert_eq!(grouped[0].label, "Todo");
    assert_eq!(titles(&grouped[0].tasks), ["a", "c"]);
}

#[tokio::test]
async fn access_snapshot_round_trip() {
    let db = database().await;
    let pool = &db.pool;

    let alice = users::create_user(pool, "alice", "", None, ApplicationRole::User).await.unwrap();
    let bob = users::create_user(pool, "bob", "Bob", Some("bob@example.com"), ApplicationRole::User)
        .await
        .unwrap();
    let private = projects::create_project(pool, "Private", false).await.unwrap();
    let open = projects::create_project(pool, "Open", true).await.unwrap();
    let team = groups::create_group(pool, "Team", None).await.unwrap();
    let err = projects::create_project(pool, "   ", false).await.unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");

    assert!(project_user_roles::add_user(pool, private.id, alice.id, ProjectRole::ProjectViewer).await.unwrap());
    assert!(!project_user_roles::add_user(pool, private.id, alice.id, ProjectRole::ProjectMember).await.unwrap());
    assert!(groups::add_member(pool, team.id, alice.id).await.unwrap());
    assert!(!groups::add_member(pool, team.id, alice.id).await.unwrap());
    assert!(project_group_roles::add_group(pool, private.id, team.id, ProjectRole::ProjectManager).await.unwrap());
    assert!(users::set_active(pool, bob.id, false).await.unwrap());

    let snapshot = access::load_snapshot(pool).await.unwrap();
    let model = PermissionModel::new(&snapshot);
    assert_eq!(model.get_user_role(private.id, alice.id), Some(ProjectRole::ProjectManager));
    assert!(model.is_member(open.id, alice.id));
    assert!(!model.is_member(open.id, bob.id));
    assert_eq!(model.get_assignable_users(open.id), vec![(alice.id, "alice".to_string())]);
    assert_eq!(
        model.get_projects_by_user(alice.id, &[ProjectStatus::Active]),
        vec![(private.id, "Private".to_string())]
    );

    assert!(project_group_roles::remove_group(pool, private.id, team.id).await.unwrap());
    assert!(!project_group_roles::remove_group(pool, private.id, team.id).await.unwrap());
    assert!(project_user_roles::change_user_role(pool, private.id, alice.id, ProjectRole::ProjectMember).await.unwrap());
    assert_eq!(
        project_user_roles::find_role(pool, private.id, alice.id).await.unwrap(),
        Some(ProjectRole::ProjectMember)
    );

    assert!(projects::remove_project(pool, private.id).await.unwrap());
    assert!(project_user_roles::list_for_project(pool, private.id).await.unwrap().is_empty());
    assert!(!projects::remove_project(pool, private.id).await.unwrap());
}
