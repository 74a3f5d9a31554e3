//! CLI command execution.
//!
//! Each [`Command`] maps onto one reducer action (or a storage operation)
//! applied through a [`Session`]. Output goes to a caller-supplied writer
//! so commands can be exercised without a terminal.

use std::io::{Read, Write};
use std::path::PathBuf;

use eisenhower_core::codec::{CodecError, ImportError};
use eisenhower_core::query::Filter;
use eisenhower_core::reducer::{TaskAction, TaskUpdate};
use eisenhower_core::task::{Priority, Task, ValidationError, validate_title};

use crate::config::{AppConfig, Command, Direction};
use crate::session::{LookupError, Session};
use crate::storage::KeyValueStore;

/// Errors surfaced to the user by a command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The task id could not be resolved.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The import document was rejected.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Export serialization failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// `edit` was run without any field to change.
    #[error("nothing to update: pass --title, --priority or --completed")]
    EmptyUpdate,

    /// Reading the import input failed.
    #[error("failed to read {path}: {source}")]
    ReadInput {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing the export file failed.
    #[error("failed to write {path}: {source}")]
    WriteOutput {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing to the output stream failed.
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Runs one command against the session, writing human-readable output.
///
/// # Errors
///
/// Returns [`CommandError`] for invalid input, unknown ids, rejected imports
/// and I/O failures on the command's own input or output. Storage failures
/// are never reported here; the session logs and absorbs them.
pub fn run<S: KeyValueStore>(
    session: &mut Session<S>,
    command: Command,
    config: &AppConfig,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    match command {
        Command::Add { title, priority } => {
            let level = priority.unwrap_or_else(|| i64::from(config.default_priority.level()));
            let state = session.add_task(&title, level)?;
            if let Some(task) = state.tasks.last() {
                writeln!(out, "added {}", describe(task))?;
            }
        }
        Command::List { filter, sort } => {
            let state = session.state();
            let (filter, sort_by) = (filter.unwrap_or(state.filter), sort.unwrap_or(state.sort_by));
            session.dispatch(TaskAction::SetFilter(filter));
            session.dispatch(TaskAction::SetSortBy(sort_by));
            print_list(session, out)?;
        }
        Command::Toggle { id } => {
            let id = session.resolve_id(&id)?;
            let state = session.dispatch(TaskAction::ToggleTask(id.clone()));
            if let Some(task) = state.find(&id) {
                let status = if task.completed { "completed" } else { "reopened" };
                writeln!(out, "{status} {}", describe(task))?;
            }
        }
        Command::Edit {
            id,
            title,
            priority,
            completed,
        } => {
            let id = session.resolve_id(&id)?;
            let mut updates = TaskUpdate::default();
            if let Some(title) = title {
                updates = updates.with_title(validate_title(&title)?);
            }
            if let Some(level) = priority {
                updates = updates.with_priority(Priority::try_from(level)?);
            }
            if let Some(completed) = completed {
                updates = updates.with_completed(completed);
            }
            if updates.is_empty() {
                return Err(CommandError::EmptyUpdate);
            }
            let state = session.dispatch(TaskAction::UpdateTask {
                id: id.clone(),
                updates,
            });
            if let Some(task) = state.find(&id) {
                writeln!(out, "updated {}", describe(task))?;
            }
        }
        Command::Priority { id, level } => {
            let id = session.resolve_id(&id)?;
            let priority = Priority::try_from(level)?;
            let state = session.dispatch(TaskAction::ChangePriority {
                id: id.clone(),
                priority: i64::from(priority.level()),
            });
            if let Some(task) = state.find(&id) {
                writeln!(out, "updated {}", describe(task))?;
            }
        }
        Command::Bump { id, direction } => {
            let id = session.resolve_id(&id)?;
            let Some(current) = session.state().find(&id).map(|t| t.priority) else {
                return Err(LookupError::NotFound(id.to_string()).into());
            };
            let target = match direction {
                Direction::Up => current.raised(),
                Direction::Down => current.lowered(),
            };
            if target == current {
                writeln!(out, "priority already at {current} ({})", current.description())?;
                return Ok(());
            }
            let state = session.dispatch(TaskAction::ChangePriority {
                id: id.clone(),
                priority: i64::from(target.level()),
            });
            if let Some(task) = state.find(&id) {
                writeln!(out, "updated {}", describe(task))?;
            }
        }
        Command::Delete { id } => {
            let id = session.resolve_id(&id)?;
            let title = session.state().find(&id).map(|t| t.title.clone());
            session.dispatch(TaskAction::DeleteTask(id.clone()));
            writeln!(out, "deleted {id} {}", title.unwrap_or_default())?;
        }
        Command::ClearCompleted => {
            let before = session.state().tasks.len();
            let after = session.dispatch(TaskAction::ClearCompleted).tasks.len();
            writeln!(out, "removed {} completed task(s)", before - after)?;
        }
        Command::Export { output } => {
            let document = session.export()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, format!("{document}\n"))
                        .map_err(|source| CommandError::WriteOutput { path, source })?;
                }
                None => writeln!(out, "{document}")?,
            }
        }
        Command::Import { input } => {
            let document = read_input(input)?;
            let count = session.import(&document)?;
            writeln!(out, "imported {count} task(s)")?;
        }
        Command::Reset => {
            session.clear_storage();
            writeln!(out, "cleared stored tasks")?;
        }
    }
    Ok(())
}

fn read_input(input: PathBuf) -> Result<String, CommandError> {
    if input.as_os_str() == "-" {
        let mut document = String::new();
        std::io::stdin()
            .read_to_string(&mut document)
            .map_err(|source| CommandError::ReadInput {
                path: input,
                source,
            })?;
        return Ok(document);
    }
    std::fs::read_to_string(&input).map_err(|source| CommandError::ReadInput {
        path: input,
        source,
    })
}

fn print_list<S: KeyValueStore>(
    session: &Session<S>,
    out: &mut impl Write,
) -> Result<(), std::io::Error> {
    let state = session.state();
    let visible = session.visible_tasks();
    if visible.is_empty() {
        writeln!(out, "{}", empty_message(state.filter))?;
    }
    for task in visible {
        writeln!(out, "{}", list_line(task))?;
    }
    let counts = state.counts();
    writeln!(
        out,
        "{} total, {} active, {} completed (filter: {}, sort: {})",
        counts.total, counts.active, counts.completed, state.filter, state.sort_by
    )
}

const fn empty_message(filter: Filter) -> &'static str {
    match filter {
        Filter::Active => "No active tasks. Great job!",
        Filter::Completed => "No completed tasks yet.",
        Filter::All => "No tasks yet. Add your first one with `eisenhower add`.",
    }
}

fn list_line(task: &Task) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    format!(
        "[{check}] {} {:<3} {}  {}  (created {})",
        task.priority,
        task.priority.label(),
        task.title,
        task.id,
        task.created_at.format("%Y-%m-%d %H:%M"),
    )
}

fn describe(task: &Task) -> String {
    format!("{} [{}] {}", task.id, task.priority, task.title)
}
