use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::CalendarError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarType {
    #[default]
    Gregorian,
    Hijri,
}

impl CalendarType {
    pub fn parse(input: &str, field: &'static str) -> Result<Self, CalendarError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "gregorian" => Ok(Self::Gregorian),
            "hijri" => Ok(Self::Hijri),
            other => Err(CalendarError::invalid(
                field,
                format!("unknown calendar '{}', expected gregorian or hijri", other),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gregorian => "gregorian",
            Self::Hijri => "hijri",
        }
    }
}

impl fmt::Display for CalendarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
