use std::fmt;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::error::CalendarError;
use super::gregorian::last_day_of_month;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl ViewKind {
    pub fn parse(input: &str, field: &'static str) -> Result<Self, CalendarError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(CalendarError::invalid(
                field,
                format!("unknown view '{}', expected day, week, month or year", other),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CalendarError> {
        if start > end {
            return Err(CalendarError::invalid(
                "date range",
                format!("start {} is after end {}", start, end),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn for_view(view: ViewKind, anchor: NaiveDate) -> Self {
        match view {
            ViewKind::Day => Self::single(anchor),
            ViewKind::Week => {
                let start = week_start(anchor);
                let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
                Self { start, end }
            }
            ViewKind::Month => {
                let start = anchor.with_day(1).unwrap_or(anchor);
                let end = last_day_of_month(anchor.year(), anchor.month()).unwrap_or(anchor);
                Self { start, end }
            }
            ViewKind::Year => {
                let start = NaiveDate::from_ymd_opt(anchor.year(), 1, 1).unwrap_or(anchor);
                let end = NaiveDate::from_ymd_opt(anchor.year(), 12, 31).unwrap_or(anchor);
                Self { start, end }
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Half-open `[start, end + 1 day)` window in UTC for the given local zone.
    pub fn utc_bounds<Tz: TimeZone>(&self, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        let after_end = self.end.succ_opt().unwrap_or(self.end);
        (local_midnight_utc(tz, self.start), local_midnight_utc(tz, after_end))
    }
}

/// Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = (date.weekday().num_days_from_monday() + 1) % 7;
    date.checked_sub_days(Days::new(u64::from(back)))
        .unwrap_or(date)
}

fn local_midnight_utc<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            // midnight skipped by a DST jump; the day starts an hour later
            tz.from_local_datetime(&(midnight + chrono::Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}
