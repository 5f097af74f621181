use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};

/// Anything that can be reduced to a calendar day. All comparisons in this
/// crate happen at day granularity, so callers may pass timestamps freely.
pub trait AsCalendarDay {
    fn calendar_day(&self) -> NaiveDate;
}

impl AsCalendarDay for NaiveDate {
    fn calendar_day(&self) -> NaiveDate {
        *self
    }
}

impl AsCalendarDay for NaiveDateTime {
    fn calendar_day(&self) -> NaiveDate {
        self.date()
    }
}

/// Uses the local date in the timestamp's own zone.
impl<Tz: TimeZone> AsCalendarDay for DateTime<Tz> {
    fn calendar_day(&self) -> NaiveDate {
        self.date_naive()
    }
}

impl<T: AsCalendarDay + ?Sized> AsCalendarDay for &T {
    fn calendar_day(&self) -> NaiveDate {
        (**self).calendar_day()
    }
}
