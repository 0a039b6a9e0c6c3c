use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Personal,
    Public,
}

impl Visibility {
    /// Only an explicit "public" makes an event public.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("public") => Visibility::Public,
            _ => Visibility::Personal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Personal => "personal",
            Visibility::Public => "public",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    All,
    Mine,
}

impl ViewMode {
    /// Anything other than "mine" falls back to the shared view.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("mine") => ViewMode::Mine,
            _ => ViewMode::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::All => "all",
            ViewMode::Mine => "mine",
        }
    }
}

/// Stored timetable event. `tags` keeps its JSON-encoded text form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEvent {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub all_day: bool,
    pub tags: String,
    pub visibility: Visibility,
    pub owner_id: Uuid,
}

/// A validated event waiting for an id.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub all_day: bool,
    pub tags: String,
    pub visibility: Visibility,
    pub owner_id: Uuid,
}

impl NewEvent {
    pub fn into_event(self, id: Uuid) -> TimetableEvent {
        TimetableEvent {
            id,
            title: self.title,
            description: self.description,
            location: self.location,
            start_at: self.start_at,
            end_at: self.end_at,
            all_day: self.all_day,
            tags: self.tags,
            visibility: self.visibility,
            owner_id: self.owner_id,
        }
    }
}

/// Half-open `[from, to)` interval over `startAt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant < self.to
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub tags: Option<String>,
    pub view: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_at: Option<String>,
    pub end_at: Option<String>,
    pub all_day: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub visibility: Option<String>,
}
