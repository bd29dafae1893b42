//! Tabular (civil) Islamic calendar.
//!
//! Dates are bridged through [`DayNumber`]: a Gregorian date is turned into its
//! absolute day count and the count is split into Hijri year, month and day, and
//! the reverse goes the same way. The Hijri side uses the 30-year cycle with 11
//! leap years (2, 5, 7, 10, 13, 16, 18, 21, 24, 26, 29), odd months of 30 days,
//! even months of 29 days and a 30-day twelfth month in leap years.
//!
//! The supported window runs from 1 Muharram 1 AH (0622-07-19) to 9999-12-31.

use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use super::day_number::DayNumber;
use super::error::CalendarError;

/// Day number of 1 Muharram 1 AH (Friday 16 July 622 Julian, 19 July 622 Gregorian).
const HIJRI_EPOCH: DayNumber = DayNumber::new(227_015);
/// Day number of 9999-12-31.
const LAST_SUPPORTED_DAY: DayNumber = DayNumber::new(3_652_059);

const DAYS_PER_CYCLE: i64 = 10_631;

const MONTH_NAMES: [&str; 12] = [
    "Muharram",
    "Safar",
    "Rabi' al-Awwal",
    "Rabi' al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Sha'ban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qi'dah",
    "Dhu al-Hijjah",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HijriDate {
    year: i32,
    month: u32,
    day: u32,
}

impl HijriDate {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, CalendarError> {
        if year < 1 {
            return Err(CalendarError::out_of_range(format!(
                "Hijri year {} is before 1 AH",
                year
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(CalendarError::invalid(
                "hijri date",
                format!("month {} is outside 1-12", month),
            ));
        }
        let max_day = days_in_month(year, month);
        if day < 1 || day > max_day {
            return Err(CalendarError::invalid(
                "hijri date",
                format!("day {} is outside 1-{} for {}-{:02}", day, max_day, year, month),
            ));
        }
        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    pub fn day_number(&self) -> DayNumber {
        day_number_of(i64::from(self.year), i64::from(self.month), i64::from(self.day))
    }

    fn from_day_number(day_number: DayNumber) -> Self {
        let elapsed = HIJRI_EPOCH.days_until(day_number);
        let year = (30 * elapsed + 10_646).div_euclid(DAYS_PER_CYCLE);
        let prior_days = day_number_of(year, 1, 1).days_until(day_number);
        let month = (11 * prior_days + 330).div_euclid(325);
        let day = day_number_of(year, month, 1).days_until(day_number) + 1;

        Self {
            year: year as i32,
            month: month as u32,
            day: day as u32,
        }
    }
}

impl fmt::Display for HijriDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl Serialize for HijriDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (14 + 11 * i64::from(year)).rem_euclid(30) < 11
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    if month % 2 == 1 || (month == 12 && is_leap_year(year)) {
        30
    } else {
        29
    }
}

pub fn to_hijri(date: NaiveDate) -> Result<HijriDate, CalendarError> {
    let day_number = DayNumber::from_gregorian(date);
    if day_number < HIJRI_EPOCH || day_number > LAST_SUPPORTED_DAY {
        return Err(CalendarError::out_of_range(format!(
            "{} is outside 0622-07-19..9999-12-31",
            date.format("%Y-%m-%d")
        )));
    }
    Ok(HijriDate::from_day_number(day_number))
}

pub fn to_gregorian(date: HijriDate) -> Result<NaiveDate, CalendarError> {
    let day_number = date.day_number();
    if day_number > LAST_SUPPORTED_DAY {
        return Err(CalendarError::out_of_range(format!(
            "{} falls after 9999-12-31",
            date
        )));
    }
    day_number
        .to_gregorian()
        .ok_or_else(|| CalendarError::out_of_range(date.to_string()))
}

fn day_number_of(year: i64, month: i64, day: i64) -> DayNumber {
    DayNumber::new(
        day + 29 * (month - 1)
            + (6 * month - 1).div_euclid(11)
            + (year - 1) * 354
            + (3 + 11 * year).div_euclid(30)
            + HIJRI_EPOCH.value()
            - 1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn hijri(year: i32, month: u32, day: u32) -> HijriDate {
        HijriDate::new(year, month, day).unwrap()
    }

    #[test]
    fn epoch_converts_to_first_of_muharram() {
        assert_eq!(to_hijri(date(622, 7, 19)).unwrap(), hijri(1, 1, 1));
    }

    #[test]
    fn first_of_ramadan_1445() {
        assert_eq!(to_hijri(date(2024, 3, 11)).unwrap(), hijri(1445, 9, 1));
    }

    #[test]
    fn new_year_1445() {
        assert_eq!(to_hijri(date(2023, 7, 19)).unwrap(), hijri(1445, 1, 1));
        assert_eq!(to_gregorian(hijri(1445, 1, 1)).unwrap(), date(2023, 7, 19));
    }

    #[test]
    fn late_august_2025() {
        assert_eq!(to_hijri(date(2025, 8, 24)).unwrap(), hijri(1447, 2, 29));
        assert_eq!(to_hijri(date(2025, 8, 25)).unwrap(), hijri(1447, 3, 1));
        assert_eq!(to_hijri(date(2025, 8, 27)).unwrap(), hijri(1447, 3, 3));
    }

    #[test]
    fn last_supported_gregorian_day_converts() {
        assert_eq!(to_hijri(date(9999, 12, 31)).unwrap(), hijri(9666, 4, 2));
    }

    #[test]
    fn date_before_epoch_is_out_of_range() {
        let result = to_hijri(date(622, 7, 18));

        assert!(matches!(result, Err(CalendarError::OutOfRange(_))));
    }

    #[test]
    fn date_after_window_is_out_of_range() {
        let result = to_hijri(date(10000, 1, 1));

        assert!(matches!(result, Err(CalendarError::OutOfRange(_))));
    }

    #[test]
    fn hijri_date_past_window_is_out_of_range() {
        let result = to_gregorian(hijri(9666, 4, 3));

        assert!(matches!(result, Err(CalendarError::OutOfRange(_))));
    }

    #[test]
    fn hijri_year_zero_is_out_of_range() {
        assert!(matches!(HijriDate::new(0, 1, 1), Err(CalendarError::OutOfRange(_))));
    }

    #[test]
    fn month_thirteen_is_invalid_input() {
        assert!(matches!(
            HijriDate::new(1446, 13, 1),
            Err(CalendarError::InvalidInput { .. })
        ));
    }

    #[test]
    fn thirtieth_of_even_month_is_invalid() {
        assert!(matches!(
            HijriDate::new(1446, 2, 30),
            Err(CalendarError::InvalidInput { .. })
        ));
    }

    #[test]
    fn dhu_al_hijjah_has_thirty_days_only_in_leap_years() {
        assert!(is_leap_year(1445));
        assert!(!is_leap_year(1446));
        assert!(HijriDate::new(1445, 12, 30).is_ok());
        assert!(HijriDate::new(1446, 12, 30).is_err());
    }

    #[test]
    fn leap_years_follow_thirty_year_cycle() {
        let leap: Vec<i32> = (1..=30).filter(|y| is_leap_year(*y)).collect();

        assert_eq!(leap, vec![2, 5, 7, 10, 13, 16, 18, 21, 24, 26, 29]);
    }

    #[test]
    fn displays_as_zero_padded_iso_like_string() {
        assert_eq!(hijri(1447, 3, 3).to_string(), "1447-03-03");
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&hijri(1445, 9, 1)).unwrap();

        assert_eq!(json, "\"1445-09-01\"");
    }

    #[test]
    fn month_name_for_ramadan() {
        assert_eq!(hijri(1445, 9, 1).month_name(), "Ramadan");
    }

    proptest! {
        #[test]
        fn gregorian_round_trips_through_hijri(offset in 0i64..(3_652_059 - 227_015)) {
            let original = DayNumber::new(227_015 + offset).to_gregorian().unwrap();

            let converted = to_hijri(original).unwrap();

            prop_assert_eq!(to_gregorian(converted).unwrap(), original);
        }

        #[test]
        fn hijri_round_trips_through_gregorian(year in 1i32..9666, month in 1u32..=12, day in 1u32..=30) {
            prop_assume!(day <= days_in_month(year, month));
            let original = hijri(year, month, day);

            let converted = to_gregorian(original).unwrap();

            prop_assert_eq!(to_hijri(converted).unwrap(), original);
        }

        #[test]
        fn consecutive_days_stay_consecutive(offset in 0i64..(3_652_058 - 227_015)) {
            let today = DayNumber::new(227_015 + offset).to_gregorian().unwrap();
            let tomorrow = today.succ_opt().unwrap();

            let a = to_hijri(today).unwrap();
            let b = to_hijri(tomorrow).unwrap();

            prop_assert_eq!(a.day_number().days_until(b.day_number()), 1);
        }
    }
}
