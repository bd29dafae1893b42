use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::calendar::parse_gregorian;
use crate::prayer::{
    IslamicDayInfo, PrayerSource, PrayerTimesResponse, StaticPrayerTable, WeekPrayerTimes,
    get_prayer_times, islamic_day_info, week_prayer_times,
};

use super::{ApiError, non_blank};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PrayerQuery {
    pub date: Option<String>,
    pub city: Option<String>,
}

impl PrayerQuery {
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }
}

pub struct PrayerService {
    source: Box<dyn PrayerSource>,
    default_city: String,
}

impl PrayerService {
    pub fn new(source: Box<dyn PrayerSource>, default_city: impl Into<String>) -> Self {
        Self {
            source,
            default_city: default_city.into(),
        }
    }

    /// Prayer times for the requested date (default: the date of `now`) with
    /// the next prayer measured from `now`.
    pub fn times(&self, query: &PrayerQuery, now: NaiveDateTime) -> Result<PrayerTimesResponse, ApiError> {
        let date = resolve_date(query.date.as_deref(), "date", now.date())?;
        let city = self.city(query.city.as_deref());
        Ok(get_prayer_times(self.source.as_ref(), date, city, now))
    }

    pub fn week(&self, query: &PrayerQuery, today: NaiveDate) -> Result<WeekPrayerTimes, ApiError> {
        let start = resolve_date(query.date.as_deref(), "start", today)?;
        let city = self.city(query.city.as_deref());
        Ok(week_prayer_times(self.source.as_ref(), start, city))
    }

    pub fn islamic_day(&self, date: Option<&str>, today: NaiveDate) -> Result<IslamicDayInfo, ApiError> {
        let date = resolve_date(date, "date", today)?;
        Ok(islamic_day_info(date))
    }

    fn city<'q>(&'q self, requested: Option<&'q str>) -> &'q str {
        non_blank(requested).unwrap_or(self.default_city.as_str())
    }
}

impl Default for PrayerService {
    fn default() -> Self {
        Self::new(Box::new(StaticPrayerTable::riyadh()), "riyadh")
    }
}

fn resolve_date(raw: Option<&str>, field: &'static str, fallback: NaiveDate) -> Result<NaiveDate, ApiError> {
    match non_blank(raw) {
        Some(raw) => Ok(parse_gregorian(raw, field)?),
        None => Ok(fallback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prayer::PrayerSchedule;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn at(d: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
        d.and_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn defaults_to_today_and_configured_city() {
        let service = PrayerService::new(Box::new(StaticPrayerTable::riyadh()), "mecca");

        let response = service
            .times(&PrayerQuery::default(), at(date(2025, 8, 26), 10, 0))
            .unwrap();

        assert_eq!(response.date, date(2025, 8, 26));
        assert_eq!(response.city, "mecca");
        assert_eq!(response.next_prayer.key, "dhuhr");
    }

    #[test]
    fn explicit_date_and_city_are_used() {
        let service = PrayerService::default();
        let query = PrayerQuery::default().with_date("2025-08-27").with_city("jeddah");

        let response = service.times(&query, at(date(2025, 8, 26), 10, 0)).unwrap();

        assert_eq!(response.date, date(2025, 8, 27));
        assert_eq!(response.city, "jeddah");
    }

    #[test]
    fn malformed_date_is_invalid_input() {
        let service = PrayerService::default();
        let query = PrayerQuery::default().with_date("27-08-2025x");

        let err = service.times(&query, at(date(2025, 8, 26), 10, 0)).unwrap_err();

        assert!(matches!(err, ApiError::InvalidInput { field: "date", .. }));
    }

    #[test]
    fn unknown_date_uses_default_schedule() {
        let table = StaticPrayerTable::new(PrayerSchedule::riyadh_default());
        let service = PrayerService::new(Box::new(table), "riyadh");
        let query = PrayerQuery::default().with_date("2030-01-01");

        let response = service.times(&query, at(date(2030, 1, 1), 5, 0)).unwrap();

        assert_eq!(response.next_prayer.key, "dhuhr");
        assert_eq!(response.next_prayer.time.format("%H:%M").to_string(), "12:05");
    }

    #[test]
    fn week_starts_at_requested_date() {
        let service = PrayerService::default();
        let query = PrayerQuery::default().with_date("2025-08-25");

        let week = service.week(&query, date(2025, 1, 1)).unwrap();

        assert_eq!(week.start_date, date(2025, 8, 25));
        assert_eq!(week.week_prayer_times.len(), 7);
    }

    #[test]
    fn bad_week_start_names_start_field() {
        let service = PrayerService::default();
        let query = PrayerQuery::default().with_date("2025-02-29");

        let err = service.week(&query, date(2025, 1, 1)).unwrap_err();

        assert!(matches!(err, ApiError::InvalidInput { field: "start", .. }));
    }

    #[test]
    fn islamic_day_defaults_to_today() {
        let service = PrayerService::default();

        let info = service.islamic_day(None, date(2025, 9, 6)).unwrap();

        assert_eq!(info.date, date(2025, 9, 6));
        assert_eq!(info.special_days, vec!["white_days"]);
    }
}
