pub mod api;
pub mod calendar;
pub mod prayer;
pub mod storage;

pub use api::{ApiError, ConversionResponse, GridQuery, GridService, PrayerQuery, PrayerService};
pub use calendar::{
    CalendarError, CalendarType, GridResult, HijriDate, TaskProjection, ViewKind, build_grid,
    to_gregorian, to_hijri,
};
pub use prayer::{PrayerError, PrayerSource, StaticPrayerTable};
pub use storage::{Config, SqliteTaskStore, StoreError, TaskSource};
