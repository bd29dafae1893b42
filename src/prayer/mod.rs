pub mod lookup;
pub mod schedule;

use thiserror::Error;

pub use lookup::{
    DayPrayerTimes, IslamicDayInfo, NextPrayer, PrayerTimesResponse, WeekPrayerTimes,
    get_prayer_times, islamic_day_info, next_prayer, week_prayer_times,
};
pub use schedule::{Prayer, PrayerSchedule, PrayerSource, StaticPrayerTable};

#[derive(Debug, Error)]
pub enum PrayerError {
    #[error("Invalid time for {prayer}: '{value}', use HH:MM")]
    InvalidTime { prayer: Prayer, value: String },
    #[error("{earlier} must come before {later}")]
    OutOfOrder { earlier: Prayer, later: Prayer },
    #[error("Invalid prayer table date: '{0}', use YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Failed to read prayer table: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse prayer table: {0}")]
    ParseError(#[from] toml::de::Error),
}
