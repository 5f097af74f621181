use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoutineError {
    #[error("frequency count must be a positive integer, got {0}")]
    InvalidCount(i64),

    #[error("unknown frequency unit `{0}` (expected day, week or month)")]
    UnknownUnit(String),

    #[error("task title must not be empty")]
    EmptyTitle,

    #[error("`{0}` is neither a calendar date nor an RFC 3339 timestamp")]
    InvalidCompletedDate(String),

    #[error("a {interval_days}-day window around {reference} leaves the supported calendar range")]
    DateOutOfRange {
        reference: NaiveDate,
        interval_days: i64,
    },
}
