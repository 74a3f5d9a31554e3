//! Task state and the reducer that applies actions to it.
//!
//! [`reduce`] is a total, pure function: it borrows the current
//! [`TaskState`] and returns a fresh one. Actions that reference an unknown
//! id, or carry values the reducer refuses (an out-of-range priority, an
//! invalid title), produce a state equal to the input.

use serde::{Deserialize, Serialize};

use crate::query::{Filter, SortBy, TaskCounts, get_filtered_and_sorted_tasks};
use crate::task::{Priority, Task, TaskId, create_task, validate_title};

/// Snapshot of the task collection plus the current view parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskState {
    /// Tasks in insertion order.
    pub tasks: Vec<Task>,
    /// Active view filter.
    pub filter: Filter,
    /// Active view ordering.
    pub sort_by: SortBy,
}

impl TaskState {
    /// The filtered and sorted view for rendering.
    #[must_use]
    pub fn visible_tasks(&self) -> Vec<&Task> {
        get_filtered_and_sorted_tasks(&self.tasks, self.filter, self.sort_by)
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// Summary counts over the whole collection.
    #[must_use]
    pub fn counts(&self) -> TaskCounts {
        TaskCounts::of(&self.tasks)
    }

    fn with_tasks(&self, tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            filter: self.filter,
            sort_by: self.sort_by,
        }
    }

    fn map_task(&self, id: &TaskId, f: impl Fn(&mut Task)) -> Self {
        let tasks = self
            .tasks
            .iter()
            .map(|task| {
                let mut task = task.clone();
                if &task.id == id {
                    f(&mut task);
                    task.touch();
                }
                task
            })
            .collect();
        self.with_tasks(tasks)
    }
}

/// Partial set of editable task fields.
///
/// `id` and `created_at` are not editable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    /// New title (trimmed before it is applied).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// New completion state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskUpdate {
    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the completion state.
    #[must_use]
    pub const fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.priority.is_none() && self.completed.is_none()
    }
}

/// State-changing actions dispatched by a front end.
///
/// Encoded as `{ "type": "ADD_TASK", "payload": ... }`. Any unrecognized
/// `type` decodes to [`TaskAction::Unknown`], whatever its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    try_from = "RawAction"
)]
pub enum TaskAction {
    /// Append a new task. Input must already be validated.
    AddTask {
        /// Task title (trimmed by the factory).
        title: String,
        /// Task priority.
        priority: Priority,
    },
    /// Merge partial fields into an existing task.
    UpdateTask {
        /// Target task.
        id: TaskId,
        /// Fields to change.
        updates: TaskUpdate,
    },
    /// Remove a task.
    DeleteTask(TaskId),
    /// Flip a task's completion state.
    ToggleTask(TaskId),
    /// Set a task's priority from a raw level, checked against the scale.
    ChangePriority {
        /// Target task.
        id: TaskId,
        /// Requested numeric level.
        priority: i64,
    },
    /// Replace the view filter.
    SetFilter(Filter),
    /// Replace the view ordering.
    #[serde(rename = "SET_SORT")]
    SetSortBy(SortBy),
    /// Replace the whole task sequence (hydration and import).
    LoadTasks(Vec<Task>),
    /// Remove every completed task.
    ClearCompleted,
    /// Any action this version does not know about.
    Unknown,
}

/// An action as read off the wire, before its `type` is interpreted.
#[derive(Deserialize)]
struct RawAction {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Deserialize)]
struct AddTaskPayload {
    title: String,
    priority: Priority,
}

#[derive(Deserialize)]
struct UpdateTaskPayload {
    id: TaskId,
    updates: TaskUpdate,
}

#[derive(Deserialize)]
struct ChangePriorityPayload {
    id: TaskId,
    priority: i64,
}

impl TryFrom<RawAction> for TaskAction {
    type Error = serde_json::Error;

    /// Known types must carry a well-formed payload; unknown types never fail.
    fn try_from(raw: RawAction) -> Result<Self, Self::Error> {
        use serde_json::from_value;

        let RawAction { kind, payload } = raw;
        let action = match kind.as_str() {
            "ADD_TASK" => {
                let AddTaskPayload { title, priority } = from_value(payload)?;
                Self::AddTask { title, priority }
            }
            "UPDATE_TASK" => {
                let UpdateTaskPayload { id, updates } = from_value(payload)?;
                Self::UpdateTask { id, updates }
            }
            "DELETE_TASK" => Self::DeleteTask(from_value(payload)?),
            "TOGGLE_TASK" => Self::ToggleTask(from_value(payload)?),
            "CHANGE_PRIORITY" => {
                let ChangePriorityPayload { id, priority } = from_value(payload)?;
                Self::ChangePriority { id, priority }
            }
            "SET_FILTER" => Self::SetFilter(from_value(payload)?),
            "SET_SORT" => Self::SetSortBy(from_value(payload)?),
            "LOAD_TASKS" => Self::LoadTasks(from_value(payload)?),
            "CLEAR_COMPLETED" => Self::ClearCompleted,
            _ => {
                tracing::debug!(kind = %kind, "unrecognized action type");
                Self::Unknown
            }
        };
        Ok(action)
    }
}

/// Applies `action` to `state`, returning the next state.
#[must_use]
pub fn reduce(state: &TaskState, action: TaskAction) -> TaskState {
    match action {
        TaskAction::AddTask { title, priority } => {
            let mut tasks = state.tasks.clone();
            tasks.push(create_task(&title, priority));
            state.with_tasks(tasks)
        }
        TaskAction::UpdateTask { id, updates } => {
            if state.find(&id).is_none() {
                return state.clone();
            }
            let title = match updates.title.as_deref().map(validate_title).transpose() {
                Ok(title) => title.map(str::to_string),
                Err(e) => {
                    tracing::warn!(task_id = %id, error = %e, "rejected task update");
                    return state.clone();
                }
            };
            state.map_task(&id, |task| {
                if let Some(title) = &title {
                    task.title.clone_from(title);
                }
                if let Some(priority) = updates.priority {
                    task.priority = priority;
                }
                if let Some(completed) = updates.completed {
                    task.completed = completed;
                }
            })
        }
        TaskAction::DeleteTask(id) => {
            let tasks = state
                .tasks
                .iter()
                .filter(|task| task.id != id)
                .cloned()
                .collect();
            state.with_tasks(tasks)
        }
        TaskAction::ToggleTask(id) => {
            if state.find(&id).is_none() {
                return state.clone();
            }
            state.map_task(&id, |task| task.completed = !task.completed)
        }
        TaskAction::ChangePriority { id, priority } => {
            let priority = match Priority::try_from(priority) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(task_id = %id, error = %e, "rejected priority change");
                    return state.clone();
                }
            };
            if state.find(&id).is_none() {
                return state.clone();
            }
            state.map_task(&id, |task| task.priority = priority)
        }
        TaskAction::SetFilter(filter) => TaskState {
            filter,
            ..state.clone()
        },
        TaskAction::SetSortBy(sort_by) => TaskState {
            sort_by,
            ..state.clone()
        },
        TaskAction::LoadTasks(tasks) => state.with_tasks(tasks),
        TaskAction::ClearCompleted => {
            let tasks = state
                .tasks
                .iter()
                .filter(|task| !task.completed)
                .cloned()
                .collect();
            state.with_tasks(tasks)
        }
        TaskAction::Unknown => {
            tracing::debug!("ignoring unknown action");
            state.clone()
        }
    }
}
