//! Task model for Eisenhower.
//!
//! Defines the [`Task`] entity, its identifier, the four-level [`Priority`]
//! scale, and the factory/validator pair used to build new tasks. Tasks are
//! only ever assembled by [`create_task`] (or rehydrated from a stored
//! document); everything else receives them read-only.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum allowed task title length in characters, after trimming.
pub const MAX_TASK_TITLE_LENGTH: usize = 200;

/// Unique identifier for a task.
///
/// Freshly created tasks get a time-ordered UUID v7 string. Identifiers
/// read back from storage or an import are kept verbatim, so any non-empty
/// string is a valid id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Wraps an existing identifier string.
    #[must_use]
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generates a fresh task identifier, unique within the process.
#[must_use]
pub fn generate_id() -> TaskId {
    TaskId::new()
}

/// Errors returned by [`validate_task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Title is empty after trimming.
    #[error("task title is required")]
    EmptyTitle,
    /// Title exceeds [`MAX_TASK_TITLE_LENGTH`] characters after trimming.
    #[error("task title must be 200 characters or less")]
    TitleTooLong,
    /// Priority is outside [`Priority::MIN`]..=[`Priority::MAX`].
    #[error("priority must be between 1 and 4")]
    InvalidPriority(i64),
}

/// Eisenhower priority level. Higher value means higher priority.
///
/// Serialized as its bare numeric level (`1..=4`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "u8")]
#[repr(u8)]
pub enum Priority {
    /// Not important, not urgent.
    Backlog = 1,
    /// Worth doing when there is room.
    NiceToHave = 2,
    /// Important but not urgent.
    #[default]
    Schedule = 3,
    /// Urgent and important.
    DoFirst = 4,
}

impl Priority {
    /// Lowest level on the scale.
    pub const MIN: Self = Self::Backlog;
    /// Highest level on the scale.
    pub const MAX: Self = Self::DoFirst;
    /// Every level, highest first.
    pub const ALL: [Self; 4] = [Self::DoFirst, Self::Schedule, Self::NiceToHave, Self::Backlog];

    /// Returns the numeric level (`1..=4`).
    #[must_use]
    pub const fn level(self) -> u8 {
        self as u8
    }

    /// Looks up the priority for a numeric level.
    #[must_use]
    pub const fn from_level(level: i64) -> Option<Self> {
        match level {
            1 => Some(Self::Backlog),
            2 => Some(Self::NiceToHave),
            3 => Some(Self::Schedule),
            4 => Some(Self::DoFirst),
            _ => None,
        }
    }

    /// One level up, saturating at [`Priority::MAX`].
    #[must_use]
    pub const fn raised(self) -> Self {
        match self {
            Self::Backlog => Self::NiceToHave,
            Self::NiceToHave => Self::Schedule,
            Self::Schedule | Self::DoFirst => Self::DoFirst,
        }
    }

    /// One level down, saturating at [`Priority::MIN`].
    #[must_use]
    pub const fn lowered(self) -> Self {
        match self {
            Self::DoFirst => Self::Schedule,
            Self::Schedule => Self::NiceToHave,
            Self::NiceToHave | Self::Backlog => Self::Backlog,
        }
    }

    /// Short marker shown next to a task title.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DoFirst => "***",
            Self::Schedule => "**",
            Self::NiceToHave => "*",
            Self::Backlog => "",
        }
    }

    /// Human-readable description of the quadrant.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::DoFirst => "Urgent & Important (Do First)",
            Self::Schedule => "Important but not urgent (Schedule)",
            Self::NiceToHave => "Nice to have",
            Self::Backlog => "Backlog",
        }
    }
}

impl TryFrom<i64> for Priority {
    type Error = ValidationError;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        Self::from_level(level).ok_or(ValidationError::InvalidPriority(level))
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.level()
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// A single unit of work.
///
/// Timestamps carry millisecond resolution so they survive the ISO-8601
/// string form used in stored documents unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique, immutable identifier.
    pub id: TaskId,
    /// Trimmed, non-empty title of at most [`MAX_TASK_TITLE_LENGTH`] characters.
    pub title: String,
    /// Eisenhower priority level.
    pub priority: Priority,
    /// Whether the task has been completed.
    pub completed: bool,
    /// When the task was created. Never changes.
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    /// When the task was last changed. Never earlier than `created_at`.
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Stamps `updated_at` with the current time.
    pub(crate) fn touch(&mut self) {
        self.updated_at = now().max(self.created_at);
    }
}

/// Current UTC time truncated to milliseconds.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Checks a title on its own, returning the trimmed form.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyTitle`] or [`ValidationError::TitleTooLong`].
pub fn validate_title(title: &str) -> Result<&str, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if trimmed.chars().count() > MAX_TASK_TITLE_LENGTH {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(trimmed)
}

/// Validates user input for a new task.
///
/// Must run before [`create_task`]; the factory trusts its input. On success
/// the typed priority is returned.
///
/// # Errors
///
/// Returns the first failing check: empty title, title too long, then
/// priority out of range.
pub fn validate_task(title: &str, priority: i64) -> Result<Priority, ValidationError> {
    validate_title(title)?;
    Priority::try_from(priority)
}

/// Builds a new, not yet completed task with a fresh id.
#[must_use]
pub fn create_task(title: &str, priority: Priority) -> Task {
    let now = now();
    Task {
        id: generate_id(),
        title: title.trim().to_string(),
        priority,
        completed: false,
        created_at: now,
        updated_at: now,
    }
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix.
pub(crate) mod iso_millis {
    use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc).trunc_subsecs(3))
    }
}
