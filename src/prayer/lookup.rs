use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Serialize, Serializer};

use crate::calendar::{HijriDate, to_hijri};

use super::schedule::{Prayer, PrayerSchedule, PrayerSource};

#[derive(Debug, Clone, PartialEq)]
pub struct NextPrayer {
    pub prayer: Prayer,
    pub at: NaiveDateTime,
    pub remaining: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrayerTimeEntry {
    #[serde(serialize_with = "serialize_hhmm")]
    pub time: NaiveTime,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrayerTimesView {
    pub fajr: PrayerTimeEntry,
    pub dhuhr: PrayerTimeEntry,
    pub asr: PrayerTimeEntry,
    pub maghrib: PrayerTimeEntry,
    pub isha: PrayerTimeEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextPrayerView {
    pub name: &'static str,
    pub key: &'static str,
    #[serde(serialize_with = "serialize_hhmm")]
    pub time: NaiveTime,
    #[serde(serialize_with = "serialize_remaining")]
    pub time_remaining: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrayerTimesResponse {
    pub date: NaiveDate,
    pub city: String,
    pub prayer_times: PrayerTimesView,
    pub next_prayer: NextPrayerView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hijri_date: Option<HijriDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPrayerTimes {
    pub date: NaiveDate,
    pub day_name: String,
    pub prayer_times: PrayerTimesView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hijri_date: Option<HijriDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekPrayerTimes {
    pub start_date: NaiveDate,
    pub city: String,
    pub week_prayer_times: Vec<DayPrayerTimes>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IslamicDayInfo {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hijri_date: Option<HijriDate>,
    pub special_days: Vec<&'static str>,
    pub recommended_actions: Vec<&'static str>,
}

impl From<&PrayerSchedule> for PrayerTimesView {
    fn from(schedule: &PrayerSchedule) -> Self {
        let entry = |prayer: Prayer| PrayerTimeEntry {
            time: schedule.time_of(prayer),
            name: prayer.arabic_name(),
        };
        Self {
            fajr: entry(Prayer::Fajr),
            dhuhr: entry(Prayer::Dhuhr),
            asr: entry(Prayer::Asr),
            maghrib: entry(Prayer::Maghrib),
            isha: entry(Prayer::Isha),
        }
    }
}

impl From<&NextPrayer> for NextPrayerView {
    fn from(next: &NextPrayer) -> Self {
        Self {
            name: next.prayer.arabic_name(),
            key: next.prayer.key(),
            time: next.at.time(),
            time_remaining: next.remaining,
        }
    }
}

/// First prayer strictly after `now`; past isha it is the next day's fajr.
pub fn next_prayer(
    today: &PrayerSchedule,
    tomorrow: &PrayerSchedule,
    now: NaiveDateTime,
) -> NextPrayer {
    let current = now.time();

    if let Some((prayer, time)) = today.iter().find(|(_, time)| *time > current) {
        let at = now.date().and_time(time);
        return NextPrayer {
            prayer,
            at,
            remaining: at - now,
        };
    }

    let next_day = now.date().succ_opt().unwrap_or(now.date());
    let at = next_day.and_time(tomorrow.time_of(Prayer::Fajr));
    NextPrayer {
        prayer: Prayer::Fajr,
        at,
        remaining: at - now,
    }
}

/// Lists `date`'s times; `next_prayer` is always measured from `now`, on `now`'s
/// own calendar date, even when `date` is another day.
pub fn get_prayer_times(
    source: &dyn PrayerSource,
    date: NaiveDate,
    city: &str,
    now: NaiveDateTime,
) -> PrayerTimesResponse {
    let schedule = schedule_or_default(source, date, city);
    let tomorrow_date = now.date().succ_opt().unwrap_or(now.date());
    let tomorrow = schedule_or_default(source, tomorrow_date, city);
    let next = next_prayer(&schedule, &tomorrow, now);

    tracing::info!(
        "Prayer times for {} in {}: next is {} at {}",
        date,
        city,
        next.prayer,
        next.at
    );

    PrayerTimesResponse {
        date,
        city: city.to_string(),
        prayer_times: PrayerTimesView::from(&schedule),
        next_prayer: NextPrayerView::from(&next),
        hijri_date: hijri_annotation(date),
    }
}

pub fn week_prayer_times(source: &dyn PrayerSource, start: NaiveDate, city: &str) -> WeekPrayerTimes {
    let week_prayer_times = start
        .iter_days()
        .take(7)
        .map(|date| DayPrayerTimes {
            date,
            day_name: arabic_day_name(date.weekday()).to_string(),
            prayer_times: PrayerTimesView::from(&schedule_or_default(source, date, city)),
            hijri_date: hijri_annotation(date),
        })
        .collect();

    WeekPrayerTimes {
        start_date: start,
        city: city.to_string(),
        week_prayer_times,
    }
}

pub fn islamic_day_info(date: NaiveDate) -> IslamicDayInfo {
    let hijri_date = hijri_annotation(date);
    let mut special_days = Vec::new();
    let mut recommended_actions = Vec::new();

    if matches!(date.weekday(), Weekday::Mon | Weekday::Thu) {
        recommended_actions.push("monday_thursday_fast");
    }

    if hijri_date.is_some_and(|hijri| (13..=15).contains(&hijri.day())) {
        special_days.push("white_days");
        recommended_actions.push("white_days_fast");
    }

    IslamicDayInfo {
        date,
        hijri_date,
        special_days,
        recommended_actions,
    }
}

pub fn arabic_day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "الاثنين",
        Weekday::Tue => "الثلاثاء",
        Weekday::Wed => "الأربعاء",
        Weekday::Thu => "الخميس",
        Weekday::Fri => "الجمعة",
        Weekday::Sat => "السبت",
        Weekday::Sun => "الأحد",
    }
}

fn schedule_or_default(source: &dyn PrayerSource, date: NaiveDate, city: &str) -> PrayerSchedule {
    source.schedule_for(date, city).unwrap_or_else(|| {
        tracing::debug!("No prayer table entry for {} in {}, using default", date, city);
        source.default_schedule()
    })
}

fn hijri_annotation(date: NaiveDate) -> Option<HijriDate> {
    match to_hijri(date) {
        Ok(hijri) => Some(hijri),
        Err(e) => {
            tracing::warn!("Omitting Hijri date for {}: {}", date, e);
            None
        }
    }
}

fn serialize_hhmm<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format("%H:%M"))
}

fn serialize_remaining<S: Serializer>(remaining: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_remaining(*remaining))
}

pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}
