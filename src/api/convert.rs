use serde::Serialize;

use crate::calendar::{
    CalendarType, format_date, parse_gregorian, parse_hijri, to_gregorian, to_hijri,
};

use super::{ApiError, non_blank};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResponse {
    pub original_date: String,
    pub converted_date: String,
    pub from_type: CalendarType,
    pub to_type: CalendarType,
}

/// Converts `date` between calendars. Missing `from`/`to` default to
/// gregorian and hijri; identical calendars echo the input untouched.
pub fn convert_date(
    date: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<ConversionResponse, ApiError> {
    let Some(date) = non_blank(date) else {
        return Err(ApiError::InvalidInput {
            field: "date",
            reason: "date is required".to_string(),
        });
    };
    let from_type = match non_blank(from) {
        Some(raw) => CalendarType::parse(raw, "from")?,
        None => CalendarType::Gregorian,
    };
    let to_type = match non_blank(to) {
        Some(raw) => CalendarType::parse(raw, "to")?,
        None => CalendarType::Hijri,
    };

    let converted_date = match (from_type, to_type) {
        (CalendarType::Gregorian, CalendarType::Hijri) => {
            to_hijri(parse_gregorian(date, "date")?)?.to_string()
        }
        (CalendarType::Hijri, CalendarType::Gregorian) => {
            format_date(to_gregorian(parse_hijri(date, "date")?)?)
        }
        _ => date.to_string(),
    };

    tracing::info!(
        "Converted {} from {} to {}: {}",
        date,
        from_type,
        to_type,
        converted_date
    );

    Ok(ConversionResponse {
        original_date: date.to_string(),
        converted_date,
        from_type,
        to_type,
    })
}
