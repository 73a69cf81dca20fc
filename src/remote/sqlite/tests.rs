use super::SqliteRemote;
use crate::domain::{ActionType, Domain, LogEntry, Priority, Task};
use crate::remote::{RemoteChange, RemoteError, RemoteStore};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

fn unique_remote_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("opsboard-remote-{}", Uuid::now_v7()))
        .join("remote.sqlite")
}

fn cleanup(path: &std::path::Path) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::remove_dir_all(parent);
    }
}

fn open(path: &std::path::Path) -> SqliteRemote {
    SqliteRemote::open(path, Duration::from_millis(10), None).expect("remote should open")
}

fn task(id: &str, title: &str) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        domain: Domain::Production,
        done: false,
        due_date: None,
        assignee: String::new(),
        tags: Vec::new(),
        priority: Priority::Medium,
        focus: false,
        from_idea: None,
        created_at: "2026-01-01T00:00:00Z".to_string(),
        author: String::new(),
        subtasks: Vec::new(),
    }
}

#[tokio::test]
async fn upsert_replaces_rows_by_id() {
    let path = unique_remote_path();
    let remote = open(&path);

    remote.upsert_task(&task("T-1", "draft")).await.expect("upsert");
    remote.upsert_task(&task("T-2", "other")).await.expect("upsert");
    let mut renamed = task("T-1", "final");
    renamed.done = true;
    remote.upsert_task(&renamed).await.expect("upsert");

    let tasks = remote.fetch_tasks().await.expect("fetch");
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0], renamed);
    assert_eq!(tasks[1].title, "other");
    assert!(remote.fetch_ideas().await.expect("fetch").is_empty());

    cleanup(&path);
}

#[tokio::test]
async fn duplicate_log_ids_are_rejected() {
    let path = unique_remote_path();
    let remote = open(&path);
    let entry = LogEntry {
        id: "L-1".to_string(),
        action: ActionType::ToggleTask,
        payload: json!({"taskId": "T-1", "done": true}),
        user: "lea".to_string(),
        timestamp: "2026-01-01T00:00:00Z".to_string(),
    };

    remote.insert_log(&entry).await.expect("first insert");
    let err = remote
        .insert_log(&entry)
        .await
        .expect_err("duplicate insert should fail");
    assert!(matches!(err, RemoteError::Duplicate { collection: "logs", .. }));

    cleanup(&path);
}

#[tokio::test]
async fn change_feed_delivers_rows_written_by_another_handle() {
    let path = unique_remote_path();
    let writer = open(&path);
    writer
        .upsert_task(&task("T-old", "before subscribe"))
        .await
        .expect("upsert");

    let reader = open(&path);
    let mut changes = reader.subscribe().await.expect("subscribe");

    writer
        .upsert_task(&task("T-new", "after subscribe"))
        .await
        .expect("upsert");

    let change = tokio::time::timeout(Duration::from_secs(5), changes.recv())
        .await
        .expect("change should arrive before the timeout")
        .expect("feed should stay open");
    match change {
        RemoteChange::Task(row) => assert_eq!(row.id, "T-new"),
        other => panic!("unexpected change: {other:?}"),
    }

    cleanup(&path);
}

#[tokio::test]
async fn malformed_rows_are_skipped_on_fetch() {
    let path = unique_remote_path();
    let remote = open(&path);
    remote.upsert_task(&task("T-1", "good")).await.expect("upsert");
    remote
        .conn()
        .execute(
            "INSERT INTO tasks (id, row, updated_at) VALUES ('T-bad', '{\"id\":1}', 'x')",
            [],
        )
        .expect("raw insert");

    let tasks = remote.fetch_tasks().await.expect("fetch");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "T-1");

    cleanup(&path);
}

#[tokio::test]
async fn session_comes_from_configured_user() {
    let path = unique_remote_path();
    let anonymous = open(&path);
    assert_eq!(anonymous.session().await.expect("session"), None);

    let named = SqliteRemote::open(&path, Duration::from_millis(10), Some("  Lea "))
        .expect("remote should open");
    let session = named
        .session()
        .await
        .expect("session")
        .expect("session should exist");
    assert_eq!(session.display_name, "Lea");

    cleanup(&path);
}
