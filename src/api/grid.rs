use chrono::{NaiveDate, TimeZone};
use serde::Deserialize;

use crate::calendar::{
    CalendarType, GridBuilder, GridResult, NoOverlays, OverlaySource, ViewKind, parse_gregorian,
};
use crate::storage::TaskSource;

use super::{ApiError, non_blank};

/// Raw grid request parameters; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GridQuery {
    pub view: Option<String>,
    pub cal: Option<String>,
    pub from: Option<String>,
    pub overlays: Option<String>,
}

impl GridQuery {
    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    pub fn with_cal(mut self, cal: impl Into<String>) -> Self {
        self.cal = Some(cal.into());
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_overlays(mut self, overlays: impl Into<String>) -> Self {
        self.overlays = Some(overlays.into());
        self
    }

    pub fn overlay_tags(&self) -> Vec<String> {
        self.overlays
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }
}

pub struct GridService<S, Tz> {
    source: S,
    tz: Tz,
    default_view: ViewKind,
    default_calendar: CalendarType,
    overlay_source: Box<dyn OverlaySource>,
}

impl<S: TaskSource, Tz: TimeZone> GridService<S, Tz> {
    pub fn new(source: S, tz: Tz) -> Self {
        Self {
            source,
            tz,
            default_view: ViewKind::default(),
            default_calendar: CalendarType::default(),
            overlay_source: Box::new(NoOverlays),
        }
    }

    pub fn with_defaults(mut self, view: ViewKind, calendar: CalendarType) -> Self {
        self.default_view = view;
        self.default_calendar = calendar;
        self
    }

    pub fn with_overlay_source(mut self, source: Box<dyn OverlaySource>) -> Self {
        self.overlay_source = source;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolves the request, loads the owner's tasks for the covered range and
    /// lays them out. `today` is the calendar date in the service time zone.
    pub fn grid(
        &self,
        owner_id: &str,
        query: &GridQuery,
        today: NaiveDate,
    ) -> Result<GridResult, ApiError> {
        let Some(owner_id) = non_blank(Some(owner_id)) else {
            return Err(ApiError::InvalidInput {
                field: "owner",
                reason: "owner id is required".to_string(),
            });
        };

        let view = match non_blank(query.view.as_deref()) {
            Some(raw) => ViewKind::parse(raw, "view")?,
            None => self.default_view,
        };
        let calendar_type = match non_blank(query.cal.as_deref()) {
            Some(raw) => CalendarType::parse(raw, "cal")?,
            None => self.default_calendar,
        };
        let anchor = match non_blank(query.from.as_deref()) {
            Some(raw) => parse_gregorian(raw, "from")?,
            None => today,
        };

        let builder = GridBuilder::new(view, calendar_type, anchor)
            .with_today(today)
            .with_overlays(query.overlay_tags())
            .with_overlay_source(self.overlay_source.as_ref());

        let (start, end) = builder.range().utc_bounds(&self.tz);
        let tasks = self.source.tasks_due_between(owner_id, start, end)?;

        tracing::info!(
            "Grid request from {}: view={} cal={} from={} ({} tasks loaded)",
            owner_id,
            view,
            calendar_type,
            anchor,
            tasks.len()
        );

        Ok(builder.build(tasks, &self.tz))
    }
}
