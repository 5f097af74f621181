use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    day::AsCalendarDay,
    error::RoutineError,
    frequency::frequency_label,
    status::DayStatus,
    task::{Task, TaskId},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateLabel {
    pub day: String,
    pub month: String,
}

/// Day-of-month number and abbreviated month name, e.g. `10` / `Jun`.
pub fn date_label(date: impl AsCalendarDay) -> DateLabel {
    let date = date.calendar_day();
    DateLabel {
        day: date.format("%-d").to_string(),
        month: date.format("%b").to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub date: NaiveDate,
    pub label: DateLabel,
    pub status: DayStatus,
    /// Past and present days can be toggled; later days are locked even
    /// when a stored record marks them completed.
    pub toggleable: bool,
}

/// Everything a screen needs to draw one task card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: TaskId,
    pub title: String,
    pub frequency_label: String,
    pub cells: Vec<DayCell>,
}

impl TaskView {
    pub fn build(task: &Task, today: impl AsCalendarDay) -> Result<Self, RoutineError> {
        let today = today.calendar_day();
        let cells = task
            .window(today)?
            .into_iter()
            .map(|date| {
                let status = task.status_on(date, today);
                DayCell {
                    date,
                    label: date_label(date),
                    status,
                    toggleable: date <= today,
                }
            })
            .collect();
        Ok(Self {
            id: task.id().clone(),
            title: task.title().to_string(),
            frequency_label: frequency_label(&task.frequency()),
            cells,
        })
    }

    pub fn today_cell(&self) -> Option<&DayCell> {
        self.cells.get(crate::window::REFERENCE_INDEX)
    }
}
