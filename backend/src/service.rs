use std::sync::Arc;

use crate::auth::Principal;
use crate::error::TimetableError;
use crate::models::{
    CreateEventRequest, ListEventsQuery, NewEvent, TimeRange, TimetableEvent, ViewMode, Visibility,
};
use crate::store::{EventStore, Store};
use crate::tags::{encode_tags, filter_by_tags, parse_tag_query};
use crate::timestamp::parse_timestamp;
use crate::validation::{optional_text, validate_input_string, MAX_TEXT_LEN, MAX_TITLE_LEN};

#[derive(Clone)]
pub struct TimetableService {
    store: Arc<dyn Store>,
    enforce_time_order: bool,
}

impl TimetableService {
    pub fn new(store: Arc<dyn Store>, enforce_time_order: bool) -> Self {
        Self {
            store,
            enforce_time_order,
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub async fn list_events(
        &self,
        principal: Option<&Principal>,
        query: &ListEventsQuery,
    ) -> Result<Vec<TimetableEvent>, TimetableError> {
        let range = parse_range(query.from.as_deref(), query.to.as_deref())?;
        let tags = parse_tag_query(query.tags.as_deref().unwrap_or(""));
        let mode = ViewMode::parse(query.view.as_deref());
        self.events_in_range(principal, range, &tags, mode).await
    }

    /// Store query for an already-parsed range, narrowed by `tags`.
    pub async fn events_in_range(
        &self,
        principal: Option<&Principal>,
        range: TimeRange,
        tags: &[String],
        mode: ViewMode,
    ) -> Result<Vec<TimetableEvent>, TimetableError> {
        let owner = principal.map(|p| p.user_id);
        let candidates = self.store.query(range, owner, mode).await?;
        let total = candidates.len();
        let events = filter_by_tags(candidates, tags);

        log::debug!(
            "Timetable query {}..{} view={} tags={:?}: {} of {} events",
            range.from,
            range.to,
            mode.as_str(),
            tags,
            events.len(),
            total
        );
        Ok(events)
    }

    pub async fn create_event(
        &self,
        principal: Option<&Principal>,
        req: CreateEventRequest,
    ) -> Result<TimetableEvent, TimetableError> {
        let principal = principal.ok_or(TimetableError::Unauthorized)?;

        let title = req.title.as_deref().unwrap_or("").trim().to_string();
        let start_at = req.start_at.as_deref().and_then(parse_timestamp);
        let end_at = req.end_at.as_deref().and_then(parse_timestamp);

        let (start_at, end_at) = match (title.is_empty(), start_at, end_at) {
            (false, Some(start), Some(end)) => (start, end),
            _ => {
                return Err(TimetableError::InvalidInput(
                    "Missing title/startAt/endAt".to_string(),
                ))
            }
        };

        if start_at >= end_at {
            if self.enforce_time_order {
                return Err(TimetableError::InvalidInput(
                    "startAt must be before endAt".to_string(),
                ));
            }
            log::warn!(
                "Accepting event '{}' with startAt {} not before endAt {}",
                title,
                start_at,
                end_at
            );
        }

        validate_input_string(&title, Some(MAX_TITLE_LEN))
            .map_err(|msg| TimetableError::InvalidInput(format!("Invalid title: {}", msg)))?;
        let description = optional_text(req.description.as_deref());
        let location = optional_text(req.location.as_deref());
        for (field, value) in [("description", &description), ("location", &location)] {
            if let Some(text) = value {
                validate_input_string(text, Some(MAX_TEXT_LEN)).map_err(|msg| {
                    TimetableError::InvalidInput(format!("Invalid {}: {}", field, msg))
                })?;
            }
        }

        let tags = encode_tags(req.tags.as_deref().unwrap_or(&[]))?;

        let created = self
            .store
            .insert(NewEvent {
                title,
                description,
                location,
                start_at,
                end_at,
                all_day: req.all_day.unwrap_or(false),
                tags,
                visibility: Visibility::parse(req.visibility.as_deref()),
                owner_id: principal.user_id,
            })
            .await?;

        log::info!(
            "User {} created {} event {}",
            principal.username,
            created.visibility.as_str(),
            created.id
        );
        Ok(created)
    }
}

fn parse_range(from: Option<&str>, to: Option<&str>) -> Result<TimeRange, TimetableError> {
    let (from, to) = match (from.filter(|s| !s.is_empty()), to.filter(|s| !s.is_empty())) {
        (Some(from), Some(to)) => (from, to),
        _ => return Err(TimetableError::InvalidRange("Missing from/to".to_string())),
    };

    match (parse_timestamp(from), parse_timestamp(to)) {
        (Some(from), Some(to)) => Ok(TimeRange { from, to }),
        _ => Err(TimetableError::InvalidRange("Invalid from/to".to_string())),
    }
}
