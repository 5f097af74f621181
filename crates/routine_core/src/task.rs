use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    completion::{CompletedDates, ToggleOutcome},
    day::AsCalendarDay,
    error::RoutineError,
    frequency::Frequency,
    status::{classify, DayStatus},
    window::{generate_window, DateWindow},
};

/// Opaque task identifier, stable for the task's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    id: TaskId,
    title: String,
    frequency: Frequency,
    completed_dates: CompletedDates,
}

impl Task {
    pub fn new(title: &str, frequency: Frequency) -> Result<Self, RoutineError> {
        Self::with_id(TaskId::generate(), title, frequency)
    }

    pub fn with_id(id: TaskId, title: &str, frequency: Frequency) -> Result<Self, RoutineError> {
        Ok(Self {
            id,
            title: normalize_title(title)?,
            frequency,
            completed_dates: CompletedDates::new(),
        })
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn completed_dates(&self) -> &CompletedDates {
        &self.completed_dates
    }

    pub fn rename(&mut self, title: &str) -> Result<(), RoutineError> {
        self.title = normalize_title(title)?;
        Ok(())
    }

    /// Returns whether the frequency actually changed.
    pub fn set_frequency(&mut self, frequency: Frequency) -> bool {
        let changed = self.frequency != frequency;
        self.frequency = frequency;
        changed
    }

    pub fn toggle(&mut self, date: impl AsCalendarDay, today: impl AsCalendarDay) -> ToggleOutcome {
        self.completed_dates.toggle(date, today)
    }

    pub fn window(&self, today: impl AsCalendarDay) -> Result<DateWindow, RoutineError> {
        generate_window(&self.frequency, today)
    }

    pub fn status_on(&self, date: impl AsCalendarDay, today: impl AsCalendarDay) -> DayStatus {
        classify(&self.completed_dates, date, today)
    }
}

fn normalize_title(title: &str) -> Result<String, RoutineError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(RoutineError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

/// Stored shape of a task. Records written without `completedDates` load
/// with an empty set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: TaskId,
    title: String,
    frequency: Frequency,
    #[serde(default)]
    completed_dates: CompletedDates,
}

impl TryFrom<TaskRecord> for Task {
    type Error = RoutineError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let mut task = Task::with_id(record.id, &record.title, record.frequency)?;
        task.completed_dates = record.completed_dates;
        Ok(task)
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            frequency: task.frequency,
            completed_dates: task.completed_dates,
        }
    }
}
