use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RoutineError;

pub const DAYS_PER_WEEK: i64 = 7;

/// A month is treated as a flat thirty days. This drifts from real calendar
/// months over long spans; schedules already shown to users depend on it, so
/// calendar-month arithmetic is deliberately not used here.
pub const DAYS_PER_MONTH: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrequencyUnit {
    Day,
    Week,
    Month,
}

impl FrequencyUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            FrequencyUnit::Day => "day",
            FrequencyUnit::Week => "week",
            FrequencyUnit::Month => "month",
        }
    }
}

impl fmt::Display for FrequencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrequencyUnit {
    type Err = RoutineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "days" => Ok(FrequencyUnit::Day),
            "week" | "weeks" => Ok(FrequencyUnit::Week),
            "month" | "months" => Ok(FrequencyUnit::Month),
            _ => Err(RoutineError::UnknownUnit(s.to_string())),
        }
    }
}

/// "Every `count` `unit`s". Construction validates `count >= 1`, so a
/// `Frequency` value always resolves to a positive interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FrequencyRecord", into = "FrequencyRecord")]
pub struct Frequency {
    unit: FrequencyUnit,
    count: u32,
}

impl Frequency {
    pub fn new(unit: FrequencyUnit, count: i64) -> Result<Self, RoutineError> {
        let count = u32::try_from(count)
            .ok()
            .filter(|count| *count >= 1)
            .ok_or(RoutineError::InvalidCount(count))?;
        Ok(Self { unit, count })
    }

    pub fn daily() -> Self {
        Self {
            unit: FrequencyUnit::Day,
            count: 1,
        }
    }

    pub fn unit(&self) -> FrequencyUnit {
        self.unit
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn interval_days(&self) -> i64 {
        resolve_interval_days(self)
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self::daily()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&frequency_label(self))
    }
}

/// Stored shape: `{ "type": "week", "value": 2 }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FrequencyRecord {
    #[serde(rename = "type")]
    unit: String,
    value: i64,
}

impl TryFrom<FrequencyRecord> for Frequency {
    type Error = RoutineError;

    fn try_from(record: FrequencyRecord) -> Result<Self, Self::Error> {
        let unit = record.unit.parse()?;
        Frequency::new(unit, record.value)
    }
}

impl From<Frequency> for FrequencyRecord {
    fn from(frequency: Frequency) -> Self {
        Self {
            unit: frequency.unit.as_str().to_string(),
            value: i64::from(frequency.count),
        }
    }
}

/// Length of one recurrence interval in days.
pub fn resolve_interval_days(frequency: &Frequency) -> i64 {
    let count = i64::from(frequency.count);
    match frequency.unit {
        FrequencyUnit::Day => count,
        FrequencyUnit::Week => count * DAYS_PER_WEEK,
        FrequencyUnit::Month => count * DAYS_PER_MONTH,
    }
}

pub fn frequency_label(frequency: &Frequency) -> String {
    let (single, noun) = match frequency.unit {
        FrequencyUnit::Day => ("Daily", "days"),
        FrequencyUnit::Week => ("Weekly", "weeks"),
        FrequencyUnit::Month => ("Monthly", "months"),
    };
    if frequency.count == 1 {
        single.to_string()
    } else {
        format!("Every {} {}", frequency.count, noun)
    }
}
