//! Single-owner session driving the reducer and the persistence lifecycle.
//!
//! A [`Session`] owns the one [`TaskState`] of the process. Front ends go
//! through it instead of touching tasks directly:
//!
//! 1. [`Session::hydrate`] loads the stored sequence once at start-up.
//! 2. [`Session::dispatch`] runs an action through [`reduce`], replaces the
//!    state, and then persists: a non-empty sequence is saved, a sequence
//!    that just became empty clears the stored document.
//!
//! View-only actions (filter, sort) never touch storage.

use eisenhower_core::codec::{self, CodecError, ImportError};
use eisenhower_core::query::{Filter, SortBy};
use eisenhower_core::reducer::{TaskAction, TaskState, reduce};
use eisenhower_core::task::{Task, TaskId, ValidationError, validate_task};

use crate::storage::{KeyValueStore, TaskStorage};

/// Errors from resolving a user-supplied task id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// No task id starts with the given text.
    #[error("no task matches id '{0}'")]
    NotFound(String),
    /// More than one task id starts with the given text.
    #[error("id '{prefix}' is ambiguous ({matches} tasks match)")]
    Ambiguous {
        /// The text that was looked up.
        prefix: String,
        /// How many ids it matched.
        matches: usize,
    },
}

/// Owns the task state and mirrors it to storage.
pub struct Session<S: KeyValueStore> {
    state: TaskState,
    storage: TaskStorage<S>,
    hydrated: bool,
}

impl<S: KeyValueStore> Session<S> {
    /// Creates a session with an empty state. Call [`hydrate`](Self::hydrate)
    /// before dispatching to pick up stored tasks.
    #[must_use]
    pub fn new(storage: TaskStorage<S>) -> Self {
        Self {
            state: TaskState::default(),
            storage,
            hydrated: false,
        }
    }

    /// Sets the initial view parameters.
    #[must_use]
    pub fn with_view(mut self, filter: Filter, sort_by: SortBy) -> Self {
        self.state.filter = filter;
        self.state.sort_by = sort_by;
        self
    }

    /// Loads stored tasks into the state. Only the first call has any
    /// effect; later calls return 0.
    ///
    /// Returns the number of tasks loaded.
    pub fn hydrate(&mut self) -> usize {
        if self.hydrated {
            tracing::debug!("session already hydrated");
            return 0;
        }
        self.hydrated = true;

        let stored = self.storage.load();
        let count = stored.len();
        if count > 0 {
            self.state = reduce(&self.state, TaskAction::LoadTasks(stored));
        }
        tracing::info!(count, key = self.storage.key(), "hydrated tasks from storage");
        count
    }

    /// Applies an action and persists the resulting task sequence.
    pub fn dispatch(&mut self, action: TaskAction) -> &TaskState {
        let next = reduce(&self.state, action);
        let tasks_changed = next.tasks != self.state.tasks;
        let was_empty = self.state.tasks.is_empty();
        self.state = next;

        if tasks_changed {
            if !self.state.tasks.is_empty() {
                self.storage.save(&self.state.tasks);
            } else if !was_empty {
                self.storage.clear();
            }
        }
        &self.state
    }

    /// Validates input, then dispatches [`TaskAction::AddTask`].
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] without touching the state.
    pub fn add_task(&mut self, title: &str, priority: i64) -> Result<&TaskState, ValidationError> {
        let priority = validate_task(title, priority)?;
        Ok(self.dispatch(TaskAction::AddTask {
            title: title.to_string(),
            priority,
        }))
    }

    /// Current state snapshot.
    #[must_use]
    pub const fn state(&self) -> &TaskState {
        &self.state
    }

    /// Filtered and sorted view of the current state.
    #[must_use]
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.state.visible_tasks()
    }

    /// Whether [`hydrate`](Self::hydrate) has run.
    #[must_use]
    pub const fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Resolves a full id or a unique id prefix to a task id.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] if nothing or more than one task matches.
    pub fn resolve_id(&self, text: &str) -> Result<TaskId, LookupError> {
        let text = text.trim();
        if let Some(task) = self.state.tasks.iter().find(|t| t.id.as_str() == text) {
            return Ok(task.id.clone());
        }
        if text.is_empty() {
            return Err(LookupError::NotFound(text.to_string()));
        }
        let mut matches = self
            .state
            .tasks
            .iter()
            .filter(|t| t.id.as_str().starts_with(text));
        match (matches.next(), matches.count()) {
            (Some(task), 0) => Ok(task.id.clone()),
            (Some(_), rest) => Err(LookupError::Ambiguous {
                prefix: text.to_string(),
                matches: rest + 1,
            }),
            (None, _) => Err(LookupError::NotFound(text.to_string())),
        }
    }

    /// Renders the current tasks as an export document.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] if serialization fails.
    pub fn export(&self) -> Result<String, CodecError> {
        codec::export_tasks(&self.state.tasks)
    }

    /// Parses an import document and replaces the task sequence with it.
    ///
    /// Returns the number of imported tasks.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] and leaves the state unchanged if the
    /// document is rejected.
    pub fn import(&mut self, document: &str) -> Result<usize, ImportError> {
        let tasks = codec::import_tasks(document)?;
        let count = tasks.len();
        self.dispatch(TaskAction::LoadTasks(tasks));
        tracing::info!(count, "imported tasks");
        Ok(count)
    }

    /// Removes the stored document. The in-memory state is left as is.
    pub fn clear_storage(&self) {
        self.storage.clear();
    }

    /// The persistence adapter.
    #[must_use]
    pub const fn storage(&self) -> &TaskStorage<S> {
        &self.storage
    }
}
