use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::{completion::CompletedDates, day::AsCalendarDay};

/// Display status of one date in a task's window. Derived on read, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Completed,
    Pending,
    Missed,
    Future,
}

impl DayStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DayStatus::Completed => "completed",
            DayStatus::Pending => "pending",
            DayStatus::Missed => "missed",
            DayStatus::Future => "future",
        }
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion wins over every date relation; otherwise the date is compared
/// to `today` by calendar day.
pub fn classify(
    completed: &CompletedDates,
    date: impl AsCalendarDay,
    today: impl AsCalendarDay,
) -> DayStatus {
    let day = date.calendar_day();
    if completed.contains(day) {
        return DayStatus::Completed;
    }
    match day.cmp(&today.calendar_day()) {
        Ordering::Equal => DayStatus::Pending,
        Ordering::Less => DayStatus::Missed,
        Ordering::Greater => DayStatus::Future,
    }
}
