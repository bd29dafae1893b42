use chrono::{Datelike, NaiveDate};

/// Absolute day count shared by every calendar conversion.
///
/// Day 1 is 0001-01-01 in the proleptic Gregorian calendar, so the value is the
/// same count chrono exposes through `num_days_from_ce`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayNumber(i64);

impl DayNumber {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> i64 {
        self.0
    }

    pub fn from_gregorian(date: NaiveDate) -> Self {
        Self(i64::from(date.num_days_from_ce()))
    }

    pub fn to_gregorian(self) -> Option<NaiveDate> {
        i32::try_from(self.0)
            .ok()
            .and_then(NaiveDate::from_num_days_from_ce_opt)
    }

    pub fn days_until(self, other: DayNumber) -> i64 {
        other.0 - self.0
    }
}
