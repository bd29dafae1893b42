use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use super::error::CalendarError;
use super::gregorian::gregorian_date;
use super::hijri::HijriDate;

static YMD_RE: OnceLock<Regex> = OnceLock::new();

fn ymd_pattern() -> &'static Regex {
    YMD_RE.get_or_init(|| {
        Regex::new(r"^(\d{1,4})-(\d{1,2})-(\d{1,2})$").expect("invalid date regex")
    })
}

pub fn parse_ymd(input: &str, field: &'static str) -> Result<(i32, u32, u32), CalendarError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CalendarError::invalid(field, "date is required"));
    }
    if trimmed.split('-').count() != 3 {
        return Err(CalendarError::invalid(
            field,
            format!("'{}' must have three fields, use YYYY-MM-DD", trimmed),
        ));
    }
    let Some(caps) = ymd_pattern().captures(trimmed) else {
        return Err(CalendarError::invalid(
            field,
            format!("'{}' is not numeric, use YYYY-MM-DD", trimmed),
        ));
    };

    let year = caps[1]
        .parse::<i32>()
        .map_err(|e| CalendarError::invalid(field, e.to_string()))?;
    let month = caps[2]
        .parse::<u32>()
        .map_err(|e| CalendarError::invalid(field, e.to_string()))?;
    let day = caps[3]
        .parse::<u32>()
        .map_err(|e| CalendarError::invalid(field, e.to_string()))?;

    Ok((year, month, day))
}

pub fn parse_gregorian(input: &str, field: &'static str) -> Result<NaiveDate, CalendarError> {
    let (year, month, day) = parse_ymd(input, field)?;
    gregorian_date(year, month, day).map_err(|err| rename_field(err, field))
}

pub fn parse_hijri(input: &str, field: &'static str) -> Result<HijriDate, CalendarError> {
    let (year, month, day) = parse_ymd(input, field)?;
    HijriDate::new(year, month, day).map_err(|err| rename_field(err, field))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn rename_field(err: CalendarError, field: &'static str) -> CalendarError {
    match err {
        CalendarError::InvalidInput { reason, .. } => CalendarError::InvalidInput { field, reason },
        other => other,
    }
}
