use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use super::{check_query, EventStore, UserStore};
use crate::error::TimetableError;
use crate::models::{NewEvent, TimeRange, TimetableEvent, User, ViewMode, Visibility};

const EVENT_COLUMNS: &str =
    "id, title, description, location, start_at, end_at, all_day, tags, visibility, owner_id";

pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.db).await
    }
}

fn event_from_row(row: &PgRow) -> TimetableEvent {
    let visibility: String = row.get("visibility");
    TimetableEvent {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        location: row.get("location"),
        start_at: row.get("start_at"),
        end_at: row.get("end_at"),
        all_day: row.get("all_day"),
        tags: row.get("tags"),
        visibility: Visibility::parse(Some(visibility.as_str())),
        owner_id: row.get("owner_id"),
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn query(
        &self,
        range: TimeRange,
        owner: Option<Uuid>,
        mode: ViewMode,
    ) -> Result<Vec<TimetableEvent>, TimetableError> {
        check_query(&range, owner, mode)?;

        let rows = match (mode, owner) {
            (ViewMode::Mine, Some(owner_id)) => {
                sqlx::query(&format!(
                    "SELECT {} FROM timetable_events
                     WHERE start_at >= $1 AND start_at < $2 AND owner_id = $3
                     ORDER BY start_at ASC",
                    EVENT_COLUMNS
                ))
                .bind(range.from)
                .bind(range.to)
                .bind(owner_id)
                .fetch_all(&self.db)
                .await?
            }
            (ViewMode::All, Some(owner_id)) => {
                sqlx::query(&format!(
                    "SELECT {} FROM timetable_events
                     WHERE start_at >= $1 AND start_at < $2
                       AND (visibility = 'public' OR owner_id = $3)
                     ORDER BY start_at ASC",
                    EVENT_COLUMNS
                ))
                .bind(range.from)
                .bind(range.to)
                .bind(owner_id)
                .fetch_all(&self.db)
                .await?
            }
            (_, None) => {
                sqlx::query(&format!(
                    "SELECT {} FROM timetable_events
                     WHERE start_at >= $1 AND start_at < $2 AND visibility = 'public'
                     ORDER BY start_at ASC",
                    EVENT_COLUMNS
                ))
                .bind(range.from)
                .bind(range.to)
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(rows.iter().map(event_from_row).collect())
    }

    async fn insert(&self, event: NewEvent) -> Result<TimetableEvent, TimetableError> {
        let row = sqlx::query(&format!(
            "INSERT INTO timetable_events
                (id, title, description, location, start_at, end_at, all_day, tags, visibility, owner_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {}",
            EVENT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.start_at)
        .bind(event.end_at)
        .bind(event.all_day)
        .bind(&event.tags)
        .bind(event.visibility.as_str())
        .bind(event.owner_id)
        .fetch_one(&self.db)
        .await?;

        Ok(event_from_row(&row))
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, username: &str) -> Result<Option<User>, TimetableError> {
        let row = sqlx::query("SELECT id, username, password_hash FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn upsert_user(&self, username: &str, password_hash: &str) -> Result<User, TimetableError> {
        let row = sqlx::query(
            "INSERT INTO users (id, username, password_hash) VALUES ($1, $2, $3)
             ON CONFLICT (username) DO UPDATE SET password_hash = EXCLUDED.password_hash
             RETURNING id, username, password_hash",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await?;
        Ok(user_from_row(&row))
    }
}
