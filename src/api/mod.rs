pub mod convert;
pub mod grid;
pub mod prayer;

use serde::Serialize;
use thiserror::Error;

use crate::calendar::CalendarError;
use crate::storage::StoreError;

pub use convert::{ConversionResponse, convert_date};
pub use grid::{GridQuery, GridService};
pub use prayer::{PrayerQuery, PrayerService};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    #[error("Date out of supported range: {0}")]
    OutOfRange(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(#[source] StoreError),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::OutOfRange(_) => "out_of_range",
            Self::NotFound(_) => "not_found",
            Self::Storage(_) => "storage",
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.kind(),
            detail: self.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub detail: String,
}

impl From<CalendarError> for ApiError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::InvalidInput { field, reason } => Self::InvalidInput { field, reason },
            CalendarError::OutOfRange(detail) => Self::OutOfRange(detail),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(format!("task {}", id)),
            other => Self::Storage(other),
        }
    }
}

/// Treats an absent or blank query parameter as missing.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
