use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use super::calendar_type::CalendarType;
use super::date_input::format_date;
use super::date_range::{DateRange, ViewKind};
use super::hijri::{HijriDate, to_hijri};
use super::task::TaskProjection;

pub trait OverlaySource {
    fn overlays_for(&self, date: NaiveDate, requested: &[String]) -> Vec<String>;
}

/// Holiday and observance data is not wired up yet; every cell gets no tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverlays;

impl OverlaySource for NoOverlays {
    fn overlays_for(&self, _date: NaiveDate, _requested: &[String]) -> Vec<String> {
        Vec::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    pub date: NaiveDate,
    pub hijri_date: Option<HijriDate>,
    pub day_name: String,
    pub day_number: u32,
    pub is_today: bool,
    pub tasks: Vec<TaskProjection>,
    pub task_count: usize,
    pub overlays: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridResult {
    pub view: ViewKind,
    pub calendar_type: CalendarType,
    pub from_date: String,
    #[serde(skip)]
    pub range: DateRange,
    pub grid: Vec<GridCell>,
    pub total_tasks: usize,
}

pub struct GridBuilder<'a> {
    view: ViewKind,
    calendar_type: CalendarType,
    anchor: NaiveDate,
    today: Option<NaiveDate>,
    requested_overlays: Vec<String>,
    overlay_source: &'a dyn OverlaySource,
}

impl<'a> GridBuilder<'a> {
    pub fn new(view: ViewKind, calendar_type: CalendarType, anchor: NaiveDate) -> Self {
        Self {
            view,
            calendar_type,
            anchor,
            today: None,
            requested_overlays: Vec::new(),
            overlay_source: &NoOverlays,
        }
    }

    /// Date flagged `is_today`; without it `build` uses the current date in its `tz`.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn with_overlays(mut self, overlays: Vec<String>) -> Self {
        self.requested_overlays = overlays;
        self
    }

    pub fn with_overlay_source(mut self, source: &'a dyn OverlaySource) -> Self {
        self.overlay_source = source;
        self
    }

    pub fn range(&self) -> DateRange {
        DateRange::for_view(self.view, self.anchor)
    }

    pub fn build<Tz: TimeZone>(&self, tasks: Vec<TaskProjection>, tz: &Tz) -> GridResult {
        let range = self.range();
        let today = self
            .today
            .unwrap_or_else(|| Utc::now().with_timezone(tz).date_naive());
        let mut by_date = group_by_due_date(tasks, &range, tz);
        let mut total_tasks = 0;

        let grid: Vec<GridCell> = range
            .dates()
            .map(|date| {
                let tasks = by_date.remove(&date).unwrap_or_default();
                total_tasks += tasks.len();
                GridCell {
                    date,
                    hijri_date: self.hijri_annotation(date),
                    day_name: date.format("%A").to_string(),
                    day_number: date.day(),
                    is_today: date == today,
                    task_count: tasks.len(),
                    tasks,
                    overlays: self
                        .overlay_source
                        .overlays_for(date, &self.requested_overlays),
                }
            })
            .collect();

        tracing::debug!(
            "Built {} grid from {} to {}: {} cells, {} tasks",
            self.view,
            range.start,
            range.end,
            grid.len(),
            total_tasks
        );

        GridResult {
            view: self.view,
            calendar_type: self.calendar_type,
            from_date: format_date(self.anchor),
            range,
            grid,
            total_tasks,
        }
    }

    fn hijri_annotation(&self, date: NaiveDate) -> Option<HijriDate> {
        if self.calendar_type != CalendarType::Hijri {
            return None;
        }
        match to_hijri(date) {
            Ok(hijri) => Some(hijri),
            Err(e) => {
                tracing::debug!("Hijri date unavailable for {}: {}", date, e);
                None
            }
        }
    }
}

pub fn build_grid<Tz: TimeZone>(
    view: ViewKind,
    calendar_type: CalendarType,
    anchor: NaiveDate,
    today: NaiveDate,
    tasks: Vec<TaskProjection>,
    tz: &Tz,
) -> GridResult {
    GridBuilder::new(view, calendar_type, anchor)
        .with_today(today)
        .build(tasks, tz)
}

fn group_by_due_date<Tz: TimeZone>(
    tasks: Vec<TaskProjection>,
    range: &DateRange,
    tz: &Tz,
) -> BTreeMap<NaiveDate, Vec<TaskProjection>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<TaskProjection>> = BTreeMap::new();

    for task in tasks {
        let Some(due_date) = task.due_date_in(tz) else {
            continue;
        };
        if !range.contains(due_date) {
            continue;
        }
        by_date.entry(due_date).or_default().push(task);
    }

    for day_tasks in by_date.values_mut() {
        day_tasks.sort_by_key(|t| t.due_at);
    }

    by_date
}
