use chrono::NaiveDate;

use super::error::CalendarError;

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

pub fn gregorian_date(year: i32, month: u32, day: u32) -> Result<NaiveDate, CalendarError> {
    if !(1..=12).contains(&month) {
        return Err(CalendarError::invalid(
            "gregorian date",
            format!("month {} is outside 1-12", month),
        ));
    }
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        CalendarError::invalid(
            "gregorian date",
            format!(
                "day {} is outside 1-{} for {}-{:02}",
                day,
                days_in_month(year, month),
                year,
                month
            ),
        )
    })
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn february_follows_leap_rule() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
    }

    #[test]
    fn thirty_day_months() {
        for month in [4, 6, 9, 11] {
            assert_eq!(days_in_month(2025, month), 30);
        }
    }

    #[test]
    fn last_day_of_december() {
        assert_eq!(
            last_day_of_month(2025, 12),
            NaiveDate::from_ymd_opt(2025, 12, 31)
        );
    }

    #[test]
    fn month_thirteen_is_invalid_input() {
        assert!(matches!(
            gregorian_date(2025, 13, 1),
            Err(CalendarError::InvalidInput { .. })
        ));
    }

    #[test]
    fn february_thirtieth_is_invalid_input() {
        let err = gregorian_date(2024, 2, 30).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid gregorian date: day 30 is outside 1-29 for 2024-02"
        );
    }
}
