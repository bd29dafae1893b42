use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    #[error("Date out of supported range: {0}")]
    OutOfRange(String),
}

impl CalendarError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn out_of_range(detail: impl Into<String>) -> Self {
        Self::OutOfRange(detail.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_names_field_and_reason() {
        let err = CalendarError::invalid("from", "month 13 is outside 1-12");

        assert_eq!(err.to_string(), "Invalid from: month 13 is outside 1-12");
    }

    #[test]
    fn out_of_range_reports_detail() {
        let err = CalendarError::out_of_range("0500-01-01 is before 0622-07-19");

        assert!(err.to_string().contains("0500-01-01"));
    }
}
