use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::PrayerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub const ALL: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Fajr => "fajr",
            Self::Dhuhr => "dhuhr",
            Self::Asr => "asr",
            Self::Maghrib => "maghrib",
            Self::Isha => "isha",
        }
    }

    pub fn arabic_name(&self) -> &'static str {
        match self {
            Self::Fajr => "الفجر",
            Self::Dhuhr => "الظهر",
            Self::Asr => "العصر",
            Self::Maghrib => "المغرب",
            Self::Isha => "العشاء",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Five local wall-clock times, strictly increasing from fajr to isha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrayerSchedule {
    times: [NaiveTime; 5],
}

impl PrayerSchedule {
    pub fn new(times: [NaiveTime; 5]) -> Result<Self, PrayerError> {
        for (i, pair) in times.windows(2).enumerate() {
            if pair[0] >= pair[1] {
                return Err(PrayerError::OutOfOrder {
                    earlier: Prayer::ALL[i],
                    later: Prayer::ALL[i + 1],
                });
            }
        }
        Ok(Self { times })
    }

    pub fn from_hhmm(times: [&str; 5]) -> Result<Self, PrayerError> {
        let mut parsed = [NaiveTime::MIN; 5];
        for (slot, (prayer, raw)) in parsed.iter_mut().zip(Prayer::ALL.iter().zip(times)) {
            *slot = NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| {
                PrayerError::InvalidTime {
                    prayer: *prayer,
                    value: raw.to_string(),
                }
            })?;
        }
        Self::new(parsed)
    }

    /// Fallback used whenever the table has no entry for a date.
    pub fn riyadh_default() -> Self {
        Self {
            times: [
                hm(4, 15),
                hm(12, 5),
                hm(15, 30),
                hm(18, 45),
                hm(20, 15),
            ],
        }
    }

    pub fn time_of(&self, prayer: Prayer) -> NaiveTime {
        self.times[prayer.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Prayer, NaiveTime)> + '_ {
        Prayer::ALL.iter().map(|p| (*p, self.time_of(*p)))
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

pub trait PrayerSource {
    fn schedule_for(&self, date: NaiveDate, city: &str) -> Option<PrayerSchedule>;

    fn default_schedule(&self) -> PrayerSchedule;
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticPrayerTable {
    entries: HashMap<NaiveDate, PrayerSchedule>,
    default: PrayerSchedule,
}

#[derive(Debug, Deserialize)]
struct RawSchedule {
    fajr: String,
    dhuhr: String,
    asr: String,
    maghrib: String,
    isha: String,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    default: Option<RawSchedule>,
    #[serde(default)]
    dates: HashMap<String, RawSchedule>,
}

impl RawSchedule {
    fn into_schedule(self) -> Result<PrayerSchedule, PrayerError> {
        PrayerSchedule::from_hhmm([
            self.fajr.as_str(),
            self.dhuhr.as_str(),
            self.asr.as_str(),
            self.maghrib.as_str(),
            self.isha.as_str(),
        ])
    }
}

impl StaticPrayerTable {
    pub fn new(default: PrayerSchedule) -> Self {
        Self {
            entries: HashMap::new(),
            default,
        }
    }

    /// Built-in Riyadh entries for late August 2025.
    pub fn riyadh() -> Self {
        let mut table = Self::new(PrayerSchedule::riyadh_default());
        let entries = [
            ((2025, 8, 25), [hm(4, 15), hm(12, 5), hm(15, 30), hm(18, 45), hm(20, 15)]),
            ((2025, 8, 26), [hm(4, 16), hm(12, 5), hm(15, 29), hm(18, 44), hm(20, 14)]),
            ((2025, 8, 27), [hm(4, 17), hm(12, 4), hm(15, 29), hm(18, 43), hm(20, 13)]),
        ];
        for ((y, m, d), times) in entries {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                table.entries.insert(date, PrayerSchedule { times });
            }
        }
        table
    }

    pub fn with_entry(mut self, date: NaiveDate, schedule: PrayerSchedule) -> Self {
        self.entries.insert(date, schedule);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_toml(content: &str) -> Result<Self, PrayerError> {
        let raw: RawTable = toml::from_str(content)?;

        let default = match raw.default {
            Some(schedule) => schedule.into_schedule()?,
            None => PrayerSchedule::riyadh_default(),
        };

        let mut table = Self::new(default);
        for (date_str, schedule) in raw.dates {
            let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                .map_err(|_| PrayerError::InvalidDate(date_str.clone()))?;
            table.entries.insert(date, schedule.into_schedule()?);
        }

        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, PrayerError> {
        let content = std::fs::read_to_string(path)?;
        let table = Self::from_toml(&content)?;
        tracing::info!(
            "Loaded {} prayer table entries from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }
}

impl Default for StaticPrayerTable {
    fn default() -> Self {
        Self::riyadh()
    }
}

impl PrayerSource for StaticPrayerTable {
    fn schedule_for(&self, date: NaiveDate, _city: &str) -> Option<PrayerSchedule> {
        self.entries.get(&date).copied()
    }

    fn default_schedule(&self) -> PrayerSchedule {
        self.default
    }
}
