use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use serde::Serialize;

use crate::calendar::{
    grid_range, month_grid, shift_month, start_of_month, GridDay, SUPPORTED_YEARS,
};
use crate::models::{CreateEventRequest, ListEventsQuery, TimeRange, TimetableEvent, ViewMode, Visibility};
use crate::tags::parse_tag_query;

/// Hour span used by the quick-add action.
pub const QUICK_ADD_START_HOUR: u32 = 12;
pub const QUICK_ADD_END_HOUR: u32 = 13;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub range: TimeRange,
    pub tags: String,
    pub view: ViewMode,
}

impl FetchTicket {
    pub fn to_query(&self) -> ListEventsQuery {
        let tags = self.tags.trim();
        ListEventsQuery {
            from: Some(self.range.from.to_rfc3339_opts(SecondsFormat::Secs, true)),
            to: Some(self.range.to.to_rfc3339_opts(SecondsFormat::Secs, true)),
            tags: (!tags.is_empty()).then(|| tags.to_string()),
            view: Some(self.view.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub event_count: usize,
}

#[derive(Debug)]
pub struct CalendarView {
    month: NaiveDate,
    selected_day: Option<NaiveDate>,
    tag_filter: String,
    view: ViewMode,
    events: Vec<TimetableEvent>,
    generation: u64,
    pending: Option<FetchTicket>,
}

impl CalendarView {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            month: start_of_month(today),
            selected_day: None,
            tag_filter: String::new(),
            view: ViewMode::All,
            events: Vec::new(),
            generation: 0,
            pending: None,
        }
    }

    pub fn month(&self) -> NaiveDate {
        self.month
    }

    pub fn selected_day(&self) -> Option<NaiveDate> {
        self.selected_day
    }

    pub fn events(&self) -> &[TimetableEvent] {
        &self.events
    }

    pub fn grid(&self) -> Option<Vec<GridDay>> {
        month_grid(self.month)
    }

    /// Issues a ticket for the current month, filter and view, superseding any pending fetch.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        let range = grid_range(self.month)?;
        self.generation += 1;
        let ticket = FetchTicket {
            generation: self.generation,
            range,
            tags: self.tag_filter.clone(),
            view: self.view,
        };
        self.pending = Some(ticket.clone());
        Some(ticket)
    }

    /// Commits `events` if `ticket` is still current; returns whether it was.
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, events: Vec<TimetableEvent>) -> bool {
        if self.pending.as_ref() != Some(ticket) {
            log::debug!("Dropping stale timetable response (generation {})", ticket.generation);
            return false;
        }
        self.pending = None;
        self.events = events;
        true
    }

    pub fn navigate(&mut self, months: i32) -> Option<FetchTicket> {
        let month = shift_month(self.month, months);
        if !SUPPORTED_YEARS.contains(&month.year()) {
            return None;
        }
        self.selected_day = None;
        self.month = month;
        self.begin_fetch()
    }

    pub fn set_tag_filter(&mut self, filter: &str) -> Option<FetchTicket> {
        self.tag_filter = filter.to_string();
        self.begin_fetch()
    }

    pub fn set_view(&mut self, view: ViewMode) -> Option<FetchTicket> {
        self.view = view;
        self.begin_fetch()
    }

    pub fn select_day(&mut self, day: NaiveDate) {
        self.selected_day = Some(day);
    }

    pub fn selected_events(&self) -> Vec<&TimetableEvent> {
        match self.selected_day {
            Some(day) => self
                .events
                .iter()
                .filter(|e| e.start_at.date_naive() == day)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn day_cells(&self) -> Option<Vec<DayCell>> {
        day_cells(self.month, &self.events)
    }

    /// Builds the quick-add request for the selected day, fixed to 12:00-13:00.
    pub fn compose_event(&self, title: &str, tags_csv: &str, visibility: Visibility) -> Option<CreateEventRequest> {
        let day = self.selected_day?;
        let at = |hour: u32| {
            NaiveTime::from_hms_opt(hour, 0, 0)
                .map(|time| {
                    Utc.from_utc_datetime(&day.and_time(time))
                        .to_rfc3339_opts(SecondsFormat::Secs, true)
                })
        };

        Some(CreateEventRequest {
            title: Some(title.to_string()),
            start_at: at(QUICK_ADD_START_HOUR),
            end_at: at(QUICK_ADD_END_HOUR),
            tags: Some(parse_tag_query(tags_csv)),
            visibility: Some(visibility.as_str().to_string()),
            ..Default::default()
        })
    }
}

/// Events grouped by the UTC date of their start.
pub fn events_by_day(events: &[TimetableEvent]) -> BTreeMap<NaiveDate, Vec<&TimetableEvent>> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&TimetableEvent>> = BTreeMap::new();
    for event in events {
        by_day.entry(event.start_at.date_naive()).or_default().push(event);
    }
    by_day
}

pub fn day_cells(month: NaiveDate, events: &[TimetableEvent]) -> Option<Vec<DayCell>> {
    let by_day = events_by_day(events);
    let cells = month_grid(month)?
        .into_iter()
        .map(|day| DayCell {
            date: day.date,
            in_month: day.in_month,
            event_count: by_day.get(&day.date).map_or(0, Vec::len),
        })
        .collect();
    Some(cells)
}

/// Month label such as "February 2026".
pub fn month_label(month: NaiveDate) -> String {
    format!("{} {}", month.format("%B"), month.year())
}
