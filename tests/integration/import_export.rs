//! Integration tests for exporting and importing task documents.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use eisenhower::commands::{self, CommandError};
use eisenhower::config::{AppConfig, Command};
use eisenhower::session::Session;
use eisenhower::storage::{MemoryStore, TaskStorage};
use eisenhower_core::codec::ImportError;
use eisenhower_core::task::Priority;
use tempfile::TempDir;

fn make_session() -> Session<Arc<MemoryStore>> {
    let mut session = Session::new(TaskStorage::new(Arc::new(MemoryStore::new())));
    session.hydrate();
    session
}

fn run(session: &mut Session<Arc<MemoryStore>>, command: Command) -> Result<String, CommandError> {
    let mut out = Vec::new();
    commands::run(session, command, &AppConfig::default(), &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn export_is_pretty_printed_with_two_space_indent() {
    let mut session = make_session();
    session.add_task("Pretty", 4).unwrap();
    let doc = session.export().unwrap();
    assert!(doc.starts_with("[\n  {\n    \"id\": "));
    assert!(doc.contains("\"createdAt\""));
}

#[test]
fn export_to_stdout_then_import_round_trips() {
    let mut source = make_session();
    source.add_task("First", 4).unwrap();
    source.add_task("Second", 1).unwrap();
    let exported = run(&mut source, Command::Export { output: None }).unwrap();

    let mut target = make_session();
    assert_eq!(target.import(&exported).unwrap(), 2);
    assert_eq!(target.state().tasks, source.state().tasks);
}

#[test]
fn import_fills_defaults_for_sparse_entries() {
    let mut session = make_session();
    let count = session
        .import(r#"[{"id": 7, "title": "  Sparse  ", "priority": 2}]"#)
        .unwrap();
    assert_eq!(count, 1);

    let task = &session.state().tasks[0];
    assert_eq!(task.id.as_str(), "7");
    assert_eq!(task.title, "Sparse");
    assert_eq!(task.priority, Priority::NiceToHave);
    assert!(!task.completed);
    assert!(task.updated_at >= task.created_at);
}

#[test]
fn import_clamps_updated_before_created() {
    let mut session = make_session();
    session
        .import(
            r#"[{"id":"a","title":"Odd","priority":3,
                 "createdAt":"2024-05-02T10:00:00.000Z",
                 "updatedAt":"2024-05-01T10:00:00.000Z"}]"#,
        )
        .unwrap();
    let task = &session.state().tasks[0];
    assert_eq!(task.updated_at, task.created_at);
}

#[test]
fn rejected_import_keeps_existing_tasks() {
    let mut session = make_session();
    session.add_task("Existing", 3).unwrap();

    let cases = [
        ("not json", "malformed"),
        (r#"{"tasks": []}"#, "not an array"),
        (r#"[{"id":"1","title":"","priority":2}]"#, "empty title"),
        (r#"[{"id":"1","title":"x","priority":5}]"#, "priority out of range"),
        (
            r#"[{"id":"1","title":"x","priority":2},{"id":"1","title":"y","priority":2}]"#,
            "duplicate id",
        ),
    ];
    for (doc, case) in cases {
        assert!(session.import(doc).is_err(), "{case} should be rejected");
        assert_eq!(session.state().tasks.len(), 1, "{case} changed the state");
        assert_eq!(session.state().tasks[0].title, "Existing");
    }
}

#[test]
fn import_errors_name_the_failure() {
    let mut session = make_session();
    let err = session.import(r#"[{"id":"1","priority":2}]"#).unwrap_err();
    assert_eq!(err, ImportError::InvalidTaskShape { index: 0 });
    assert!(err.to_string().starts_with("failed to import tasks"));
}

#[test]
fn import_command_reads_file_and_reports_count() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("backup.json");
    std::fs::write(
        &path,
        r#"[{"id":"x1","title":"From backup","priority":4,"completed":true}]"#,
    )
    .unwrap();

    let mut session = make_session();
    let out = run(&mut session, Command::Import { input: path }).unwrap();
    assert_eq!(out.trim(), "imported 1 task(s)");
    assert!(session.state().tasks[0].completed);
}

#[test]
fn import_command_surfaces_rejection() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{}").unwrap();

    let mut session = make_session();
    let err = run(&mut session, Command::Import { input: path }).unwrap_err();
    assert!(matches!(err, CommandError::Import(ImportError::NotAnArray)));
}
