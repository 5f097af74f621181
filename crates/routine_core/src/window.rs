use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::{day::AsCalendarDay, error::RoutineError, frequency::Frequency};

/// Occurrences shown before the reference date.
pub const PAST_OCCURRENCES: i64 = 4;
/// Occurrences shown after the reference date.
pub const FUTURE_OCCURRENCES: i64 = 2;
pub const WINDOW_LEN: usize = (PAST_OCCURRENCES + 1 + FUTURE_OCCURRENCES) as usize;
/// Position of the reference date inside the window.
pub const REFERENCE_INDEX: usize = PAST_OCCURRENCES as usize;

/// The seven dates displayed for a task, oldest first. Recomputed on every
/// read and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DateWindow {
    dates: [NaiveDate; WINDOW_LEN],
}

impl DateWindow {
    pub fn dates(&self) -> &[NaiveDate; WINDOW_LEN] {
        &self.dates
    }

    pub fn reference(&self) -> NaiveDate {
        self.dates[REFERENCE_INDEX]
    }

    pub fn past(&self) -> &[NaiveDate] {
        &self.dates[..REFERENCE_INDEX]
    }

    pub fn upcoming(&self) -> &[NaiveDate] {
        &self.dates[REFERENCE_INDEX + 1..]
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }
}

impl IntoIterator for DateWindow {
    type Item = NaiveDate;
    type IntoIter = std::array::IntoIter<NaiveDate, WINDOW_LEN>;

    fn into_iter(self) -> Self::IntoIter {
        self.dates.into_iter()
    }
}

/// Dates at `-4..=+2` intervals around `reference`.
pub fn generate_window(
    frequency: &Frequency,
    reference: impl AsCalendarDay,
) -> Result<DateWindow, RoutineError> {
    let interval_days = frequency.interval_days();
    let reference = reference.calendar_day();
    let out_of_range = || RoutineError::DateOutOfRange {
        reference,
        interval_days,
    };

    let mut dates = [reference; WINDOW_LEN];
    for (slot, step) in dates
        .iter_mut()
        .zip(-PAST_OCCURRENCES..=FUTURE_OCCURRENCES)
    {
        let offset = step.checked_mul(interval_days).ok_or_else(out_of_range)?;
        *slot = shift_days(reference, offset).ok_or_else(out_of_range)?;
    }
    Ok(DateWindow { dates })
}

fn shift_days(date: NaiveDate, offset: i64) -> Option<NaiveDate> {
    let magnitude = Days::new(offset.unsigned_abs());
    if offset < 0 {
        date.checked_sub_days(magnitude)
    } else {
        date.checked_add_days(magnitude)
    }
}
