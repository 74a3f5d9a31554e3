//! Integration tests for the task lifecycle against file-backed storage.
//!
//! Each test drives a [`Session`] the way the CLI does: hydrate once,
//! dispatch actions, and check what a fresh process would read back.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;

use eisenhower::session::Session;
use eisenhower::storage::{FileStore, KeyValueStore, TaskStorage};
use eisenhower_core::codec::STORAGE_KEY;
use eisenhower_core::query::{Filter, SortBy};
use eisenhower_core::reducer::{TaskAction, TaskUpdate};
use eisenhower_core::task::Priority;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Opens and hydrates a session over `dir`, as a new process would.
fn open(dir: &Path) -> Session<FileStore> {
    let mut session = Session::new(TaskStorage::new(FileStore::new(dir)));
    session.hydrate();
    session
}

fn titles(session: &Session<FileStore>) -> Vec<String> {
    session
        .visible_tasks()
        .into_iter()
        .map(|t| t.title.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn tasks_survive_restart() {
    let dir = TempDir::new().unwrap();
    {
        let mut session = open(dir.path());
        session.add_task("Write report", 4).unwrap();
        session.add_task("Buy milk", 1).unwrap();
    }

    let session = open(dir.path());
    assert_eq!(titles(&session), ["Write report", "Buy milk"]);
    assert_eq!(session.state().tasks[0].priority, Priority::DoFirst);
}

#[test]
fn report_and_milk_scenario() {
    let dir = TempDir::new().unwrap();
    let mut session = open(dir.path());
    session.add_task("Buy milk", 1).unwrap();
    session.add_task("Write report", 4).unwrap();
    assert_eq!(titles(&session), ["Write report", "Buy milk"]);

    let milk = session.resolve_id(session.state().tasks[0].id.as_str()).unwrap();
    session.dispatch(TaskAction::ToggleTask(milk.clone()));
    session.dispatch(TaskAction::SetFilter(Filter::Active));
    assert_eq!(titles(&session), ["Write report"]);

    session.dispatch(TaskAction::SetFilter(Filter::Completed));
    assert_eq!(titles(&session), ["Buy milk"]);

    session.dispatch(TaskAction::ClearCompleted);
    let reopened = open(dir.path());
    assert_eq!(titles(&reopened), ["Write report"]);
    assert!(reopened.state().find(&milk).is_none());
}

#[test]
fn changes_persist_with_fresh_updated_at() {
    let dir = TempDir::new().unwrap();
    let mut session = open(dir.path());
    session
        .import(
            r#"[{"id":"old","title":"Draft","priority":2,
                 "createdAt":"2020-01-01T00:00:00.000Z",
                 "updatedAt":"2020-01-01T00:00:00.000Z"}]"#,
        )
        .unwrap();
    let original = session.state().tasks[0].clone();

    session.dispatch(TaskAction::UpdateTask {
        id: original.id.clone(),
        updates: TaskUpdate::default()
            .with_title("Final")
            .with_priority(Priority::Schedule),
    });

    let mut reopened = open(dir.path());
    let task = reopened.state().find(&original.id).unwrap().clone();
    assert_eq!(task.title, "Final");
    assert_eq!(task.priority, Priority::Schedule);
    assert_eq!(task.created_at, original.created_at);
    assert!(task.updated_at > original.updated_at);

    reopened.dispatch(TaskAction::ToggleTask(original.id.clone()));
    let toggled = open(dir.path()).state().find(&original.id).unwrap().clone();
    assert!(toggled.completed);
    assert!(toggled.updated_at >= task.updated_at);
    assert_eq!(toggled.created_at, original.created_at);
}

#[test]
fn deleting_everything_removes_document() {
    let dir = TempDir::new().unwrap();
    let mut session = open(dir.path());
    session.add_task("Only", 3).unwrap();
    let file = dir.path().join(format!("{STORAGE_KEY}.json"));
    assert!(file.exists());

    let id = session.state().tasks[0].id.clone();
    session.dispatch(TaskAction::DeleteTask(id));
    assert!(!file.exists());
    assert!(open(dir.path()).state().tasks.is_empty());
}

#[test]
fn corrupted_document_starts_empty_and_recovers() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    store.set(STORAGE_KEY, "{ not json").unwrap();

    let mut session = open(dir.path());
    assert!(session.state().tasks.is_empty());

    session.add_task("Fresh start", 3).unwrap();
    let reopened = open(dir.path());
    assert_eq!(titles(&reopened), ["Fresh start"]);
}

#[test]
fn stored_document_is_compact_camel_case_json() {
    let dir = TempDir::new().unwrap();
    let mut session = open(dir.path());
    session.add_task("Shape", 2).unwrap();

    let raw = FileStore::new(dir.path()).get(STORAGE_KEY).unwrap().unwrap();
    assert!(!raw.contains('\n'));
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let task = &value[0];
    assert_eq!(task["title"], "Shape");
    assert_eq!(task["priority"], 2);
    assert_eq!(task["completed"], false);
    assert!(task["createdAt"].as_str().unwrap().ends_with('Z'));
    assert!(task["updatedAt"].is_string());
}

#[test]
fn custom_key_is_isolated() {
    let dir = TempDir::new().unwrap();
    let mut work = Session::new(TaskStorage::with_key(FileStore::new(dir.path()), "work-tasks"));
    work.hydrate();
    work.add_task("Work item", 4).unwrap();

    assert!(open(dir.path()).state().tasks.is_empty());
    assert!(dir.path().join("work-tasks.json").exists());
}

#[test]
fn view_settings_are_not_persisted() {
    let dir = TempDir::new().unwrap();
    let mut session = open(dir.path()).with_view(Filter::Completed, SortBy::Created);
    session.add_task("Visible later", 1).unwrap();
    assert!(session.visible_tasks().is_empty());

    let reopened = open(dir.path());
    assert_eq!(reopened.state().filter, Filter::All);
    assert_eq!(reopened.state().sort_by, SortBy::Priority);
    assert_eq!(titles(&reopened), ["Visible later"]);
}
