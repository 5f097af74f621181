use std::collections::BTreeSet;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize, Serializer};

use crate::{day::AsCalendarDay, error::RoutineError};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Calendar days on which a task was marked done. Holds at most one entry
/// per day; serialized as an ascending list of `YYYY-MM-DD` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct CompletedDates(BTreeSet<NaiveDate>);

impl CompletedDates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: impl AsCalendarDay) -> bool {
        self.0.contains(&date.calendar_day())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.0.iter().copied()
    }

    /// Flips completion of `date`'s calendar day. Future days are refused
    /// and leave the set untouched.
    pub fn toggle(
        &mut self,
        date: impl AsCalendarDay,
        today: impl AsCalendarDay,
    ) -> ToggleOutcome {
        let day = date.calendar_day();
        let today = today.calendar_day();
        if day > today {
            tracing::debug!(%day, %today, "refusing to complete a future date");
            return ToggleOutcome::Rejected;
        }
        if self.0.remove(&day) {
            ToggleOutcome::Removed(day)
        } else {
            self.0.insert(day);
            ToggleOutcome::Added(day)
        }
    }
}

impl FromIterator<NaiveDate> for CompletedDates {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for CompletedDates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|day| day.format(DATE_FORMAT).to_string()))
    }
}

impl TryFrom<Vec<String>> for CompletedDates {
    type Error = RoutineError;

    fn try_from(raw: Vec<String>) -> Result<Self, Self::Error> {
        raw.iter()
            .map(|value| parse_completed_day_in(value, &Local))
            .collect()
    }
}

/// Accepts plain dates and full RFC 3339 timestamps. A timestamp counts for
/// the calendar day it falls on in `zone`.
fn parse_completed_day_in<Tz: TimeZone>(
    value: &str,
    zone: &Tz,
) -> Result<NaiveDate, RoutineError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .or_else(|_| {
            DateTime::parse_from_rfc3339(trimmed).map(|ts| ts.with_timezone(zone).date_naive())
        })
        .map_err(|_| RoutineError::InvalidCompletedDate(value.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added(NaiveDate),
    Removed(NaiveDate),
    /// The date lies after today; nothing changed.
    Rejected,
}

impl ToggleOutcome {
    pub fn is_change(&self) -> bool {
        !matches!(self, ToggleOutcome::Rejected)
    }
}

/// Result of [`toggle`]: the updated set together with what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggled {
    pub dates: CompletedDates,
    pub outcome: ToggleOutcome,
}

/// Non-mutating form of [`CompletedDates::toggle`]. Persisting the returned
/// set is up to the caller.
pub fn toggle(
    completed: &CompletedDates,
    date: impl AsCalendarDay,
    today: impl AsCalendarDay,
) -> Toggled {
    let mut dates = completed.clone();
    let outcome = dates.toggle(date, today);
    Toggled { dates, outcome }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn toggling_today_twice_round_trips() {
        let today = date(2024, 6, 10);
        let empty = CompletedDates::new();

        let first = toggle(&empty, today, today);
        assert_eq!(first.outcome, ToggleOutcome::Added(today));
        assert!(first.dates.contains(today));

        let second = toggle(&first.dates, today, today);
        assert_eq!(second.outcome, ToggleOutcome::Removed(today));
        assert_eq!(second.dates, empty);
    }

    #[test]
    fn removing_then_adding_restores_the_set() {
        let today = date(2024, 6, 10);
        let original: CompletedDates = [date(2024, 6, 3), date(2024, 6, 7)].into_iter().collect();
        let once = toggle(&original, date(2024, 6, 3), today);
        assert_eq!(once.outcome, ToggleOutcome::Removed(date(2024, 6, 3)));
        let twice = toggle(&once.dates, date(2024, 6, 3), today);
        assert_eq!(twice.dates, original);
    }

    #[test]
    fn future_dates_are_rejected_without_mutation() {
        let today = date(2024, 6, 10);
        let original: CompletedDates = [date(2024, 6, 9)].into_iter().collect();
        let result = toggle(&original, date(2024, 6, 15), today);
        assert_eq!(result.outcome, ToggleOutcome::Rejected);
        assert!(!result.outcome.is_change());
        assert_eq!(result.dates, original);
    }

    #[test]
    fn later_time_on_the_same_day_is_not_future() {
        let today = date(2024, 6, 10).and_time(NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        let tonight = date(2024, 6, 10).and_time(NaiveTime::from_hms_opt(22, 30, 0).unwrap());
        let mut dates = CompletedDates::new();
        assert_eq!(dates.toggle(tonight, today), ToggleOutcome::Added(date(2024, 6, 10)));
    }

    #[test]
    fn same_day_with_different_time_removes_existing_entry() {
        let today = date(2024, 6, 10);
        let mut dates: CompletedDates = [date(2024, 6, 8)].into_iter().collect();
        let evening = date(2024, 6, 8).and_time(NaiveTime::from_hms_opt(19, 0, 0).unwrap());
        assert_eq!(dates.toggle(evening, today), ToggleOutcome::Removed(date(2024, 6, 8)));
        assert!(dates.is_empty());
    }

    #[test]
    fn deserializes_plain_dates_once_per_day() {
        let parsed: CompletedDates =
            serde_json::from_str(r#"["2024-06-10", " 2024-06-08 ", "2024-06-10"]"#).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(parsed.contains(date(2024, 6, 8)));
        assert_eq!(
            serde_json::to_string(&parsed).unwrap(),
            r#"["2024-06-08","2024-06-10"]"#
        );
    }

    #[test]
    fn legacy_timestamps_land_on_the_local_day() {
        let moscow = FixedOffset::east_opt(3 * 3600).unwrap();
        assert_eq!(
            parse_completed_day_in("2024-06-09T22:00:00.000Z", &moscow).unwrap(),
            date(2024, 6, 10)
        );
        assert_eq!(
            parse_completed_day_in("2024-06-10T01:30:00+05:00", &moscow).unwrap(),
            date(2024, 6, 9)
        );
        assert_eq!(
            parse_completed_day_in("2024-06-09", &moscow).unwrap(),
            date(2024, 6, 9)
        );
    }

    #[test]
    fn rejects_unparseable_entries() {
        let err = serde_json::from_str::<CompletedDates>(r#"["yesterday"]"#).unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }
}
