//! Derived views over a task sequence.
//!
//! All functions here are pure: they borrow the input and return a new
//! `Vec` of references, leaving the original sequence untouched.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// View predicate selecting tasks by completion state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Every task.
    #[default]
    All,
    /// Tasks not yet completed.
    Active,
    /// Completed tasks.
    Completed,
}

impl Filter {
    /// Returns `true` if the task passes this filter.
    #[must_use]
    pub const fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

/// Ordering applied to the visible task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Highest priority first.
    #[default]
    Priority,
    /// Newest `created_at` first.
    Created,
    /// Most recently updated first.
    Updated,
}

impl SortBy {
    /// Compares two tasks for this ordering (descending).
    #[must_use]
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::Priority => b.priority.cmp(&a.priority),
            Self::Created => b.created_at.cmp(&a.created_at),
            Self::Updated => b.updated_at.cmp(&a.updated_at),
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

/// Error returned when parsing a [`Filter`] or [`SortBy`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseViewError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl FromStr for Filter {
    type Err = ParseViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseViewError {
                kind: "filter",
                value: s.to_string(),
                expected: "all, active, completed",
            }),
        }
    }
}

impl FromStr for SortBy {
    type Err = ParseViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "priority" => Ok(Self::Priority),
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            _ => Err(ParseViewError {
                kind: "sort order",
                value: s.to_string(),
                expected: "priority, created, updated",
            }),
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the tasks passing `filter`, in input order.
#[must_use]
pub fn filter_tasks(tasks: &[Task], filter: Filter) -> Vec<&Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}

/// Returns a new, sorted sequence of references.
///
/// The sort is stable: tasks that compare equal keep their input order.
#[must_use]
pub fn sort_tasks<'a, I>(tasks: I, sort_by: SortBy) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut sorted: Vec<&Task> = tasks.into_iter().collect();
    sorted.sort_by(|a, b| sort_by.compare(a, b));
    sorted
}

/// Filters, then sorts.
#[must_use]
pub fn get_filtered_and_sorted_tasks(
    tasks: &[Task],
    filter: Filter,
    sort_by: SortBy,
) -> Vec<&Task> {
    sort_tasks(filter_tasks(tasks, filter), sort_by)
}

/// Summary counts for the filter controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    /// Number of tasks.
    pub total: usize,
    /// Tasks not yet completed.
    pub active: usize,
    /// Completed tasks.
    pub completed: usize,
}

impl TaskCounts {
    /// Counts the given tasks.
    #[must_use]
    pub fn of(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.completed).count();
        Self {
            total: tasks.len(),
            active: tasks.len() - completed,
            completed,
        }
    }
}
