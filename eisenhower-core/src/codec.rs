//! JSON document codec for task collections.
//!
//! Three forms share one shape (an array of task objects with ISO-8601
//! timestamps):
//!
//! - the storage document, compact, written by [`encode`] and read strictly
//!   by [`decode`];
//! - the export document, pretty-printed with two-space indentation
//!   ([`export_tasks`]);
//! - the import input, parsed leniently by [`import_tasks`]: timestamps may
//!   be missing, but identity, title and priority must be present.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::task::{self, Priority, Task, TaskId, iso_millis, validate_title};

/// Fixed key under which the task document is stored.
pub const STORAGE_KEY: &str = "eisenhower-tasks";

/// Error type for storage document encode/decode.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors returned by [`import_tasks`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    /// The input is not valid JSON.
    #[error("failed to import tasks: {0}")]
    MalformedDocument(String),
    /// The top-level value is not an array.
    #[error("failed to import tasks: data must be an array of tasks")]
    NotAnArray,
    /// An element lacks a usable `id`, `title` or `priority`.
    #[error("failed to import tasks: invalid task structure at index {index}")]
    InvalidTaskShape {
        /// Position of the offending element.
        index: usize,
    },
    /// Two elements share an `id`.
    #[error("failed to import tasks: duplicate task id {0}")]
    DuplicateId(TaskId),
}

/// Encodes tasks as the compact storage document.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the tasks cannot be serialized.
pub fn encode(tasks: &[Task]) -> Result<String, CodecError> {
    serde_json::to_string(tasks).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a storage document.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the document is not a well-formed
/// task array.
pub fn decode(document: &str) -> Result<Vec<Task>, CodecError> {
    serde_json::from_str(document).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Renders tasks as a pretty-printed export document.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the tasks cannot be serialized.
pub fn export_tasks(tasks: &[Task]) -> Result<String, CodecError> {
    serde_json::to_string_pretty(tasks).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Parses an import document.
///
/// Every element needs a non-empty string or non-zero numeric `id`, a title that
/// passes [`validate_title`], and an integer `priority` on the scale.
/// `completed` defaults to `false`; missing or unreadable timestamps default
/// to the time of the import.
///
/// # Errors
///
/// See [`ImportError`].
pub fn import_tasks(document: &str) -> Result<Vec<Task>, ImportError> {
    let value: Value =
        serde_json::from_str(document).map_err(|e| ImportError::MalformedDocument(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(ImportError::NotAnArray);
    };

    let now = task::now();
    let mut seen = HashSet::with_capacity(items.len());
    let mut tasks = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let task = import_task(item, now).ok_or(ImportError::InvalidTaskShape { index })?;
        if !seen.insert(task.id.clone()) {
            return Err(ImportError::DuplicateId(task.id));
        }
        tasks.push(task);
    }
    tracing::debug!(count = tasks.len(), "parsed import document");
    Ok(tasks)
}

fn import_task(item: &Value, now: DateTime<Utc>) -> Option<Task> {
    let id = match item.get("id")? {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) if n.as_f64().is_some_and(|v| v.abs() > 0.0) => n.to_string(),
        _ => return None,
    };
    let title = validate_title(item.get("title")?.as_str()?).ok()?;
    let priority = Priority::from_level(item.get("priority")?.as_i64()?)?;
    let completed = item.get("completed").and_then(Value::as_bool).unwrap_or(false);

    let created_at = import_timestamp(item, "createdAt", now);
    let updated_at = import_timestamp(item, "updatedAt", now).max(created_at);

    Some(Task {
        id: TaskId::from_string(id),
        title: title.to_string(),
        priority,
        completed,
        created_at,
        updated_at,
    })
}

fn import_timestamp(item: &Value, field: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    match item.get(field) {
        None | Some(Value::Null) => now,
        Some(Value::String(raw)) => iso_millis::parse(raw).unwrap_or_else(|e| {
            tracing::warn!(
                field,
                value = %raw,
                error = %e,
                "unreadable timestamp, using import time"
            );
            now
        }),
        Some(other) => {
            tracing::warn!(field, value = %other, "non-string timestamp, using import time");
            now
        }
    }
}
