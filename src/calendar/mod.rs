pub mod calendar_type;
pub mod date_input;
pub mod date_range;
pub mod day_number;
pub mod error;
pub mod gregorian;
pub mod grid;
pub mod hijri;
pub mod task;

pub use calendar_type::CalendarType;
pub use date_input::{format_date, parse_gregorian, parse_hijri};
pub use date_range::{DateRange, ViewKind};
pub use day_number::DayNumber;
pub use error::CalendarError;
pub use grid::{GridBuilder, GridCell, GridResult, NoOverlays, OverlaySource, build_grid};
pub use hijri::{HijriDate, to_gregorian, to_hijri};
pub use task::{TaskPriority, TaskProjection, TaskStatus};
