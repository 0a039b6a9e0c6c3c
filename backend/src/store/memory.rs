use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{check_query, EventStore, UserStore};
use crate::error::TimetableError;
use crate::models::{NewEvent, TimeRange, TimetableEvent, User, ViewMode, Visibility};

/// Process-local store for development runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    events: RwLock<Vec<TimetableEvent>>,
    users: RwLock<HashMap<String, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn push_raw(&self, event: TimetableEvent) {
        self.events.write().await.push(event);
    }
}

fn visible(event: &TimetableEvent, owner: Option<Uuid>, mode: ViewMode) -> bool {
    let owned = owner == Some(event.owner_id);
    match mode {
        ViewMode::Mine => owned,
        ViewMode::All => owned || event.visibility == Visibility::Public,
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn query(
        &self,
        range: TimeRange,
        owner: Option<Uuid>,
        mode: ViewMode,
    ) -> Result<Vec<TimetableEvent>, TimetableError> {
        check_query(&range, owner, mode)?;

        let mut matches: Vec<TimetableEvent> = self
            .events
            .read()
            .await
            .iter()
            .filter(|e| range.contains(e.start_at) && visible(e, owner, mode))
            .cloned()
            .collect();
        matches.sort_by_key(|e| e.start_at);
        Ok(matches)
    }

    async fn insert(&self, event: NewEvent) -> Result<TimetableEvent, TimetableError> {
        let stored = event.into_event(Uuid::new_v4());
        self.events.write().await.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, username: &str) -> Result<Option<User>, TimetableError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn upsert_user(&self, username: &str, password_hash: &str) -> Result<User, TimetableError> {
        let mut users = self.users.write().await;
        let user = users.entry(username.to_string()).or_insert_with(|| User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: String::new(),
        });
        user.password_hash = password_hash.to_string();
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, day, hour, 0, 0).unwrap()
    }

    fn new_event(title: &str, start: DateTime<Utc>, visibility: Visibility, owner: Uuid) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            description: None,
            location: None,
            start_at: start,
            end_at: start + chrono::Duration::hours(1),
            all_day: false,
            tags: "[]".to_string(),
            visibility,
            owner_id: owner,
        }
    }

    fn february() -> TimeRange {
        TimeRange {
            from: at(1, 0),
            to: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
        }
    }

    fn titles(events: &[TimetableEvent]) -> Vec<&str> {
        events.iter().map(|e| e.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_query_range_is_half_open_and_sorted() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        store.insert(new_event("late", at(20, 9), Visibility::Public, owner)).await.unwrap();
        store.insert(new_event("first", at(1, 0), Visibility::Public, owner)).await.unwrap();
        store
            .insert(new_event("march", Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(), Visibility::Public, owner))
            .await
            .unwrap();

        let events = store.query(february(), Some(owner), ViewMode::All).await.unwrap();
        assert_eq!(titles(&events), vec!["first", "late"]);
    }

    #[tokio::test]
    async fn test_visibility_rules() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store.insert(new_event("alice private", at(2, 9), Visibility::Personal, alice)).await.unwrap();
        store.insert(new_event("alice public", at(3, 9), Visibility::Public, alice)).await.unwrap();
        store.insert(new_event("bob private", at(4, 9), Visibility::Personal, bob)).await.unwrap();

        let all = store.query(february(), Some(bob), ViewMode::All).await.unwrap();
        assert_eq!(titles(&all), vec!["alice public", "bob private"]);

        let mine = store.query(february(), Some(bob), ViewMode::Mine).await.unwrap();
        assert_eq!(titles(&mine), vec!["bob private"]);

        let anonymous = store.query(february(), None, ViewMode::All).await.unwrap();
        assert_eq!(titles(&anonymous), vec!["alice public"]);
    }

    #[tokio::test]
    async fn test_mine_without_owner_fails() {
        let store = MemoryStore::new();
        let result = store.query(february(), None, ViewMode::Mine).await;
        assert!(matches!(result, Err(TimetableError::NoOwner)));
    }

    #[tokio::test]
    async fn test_inverted_range_fails() {
        let store = MemoryStore::new();
        let range = TimeRange { from: at(10, 0), to: at(1, 0) };
        let result = store.query(range, Some(Uuid::new_v4()), ViewMode::All).await;
        assert!(matches!(result, Err(TimetableError::InvalidRange(_))));
    }

    #[tokio::test]
    async fn test_insert_assigns_unique_ids() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let a = store.insert(new_event("a", at(2, 9), Visibility::Public, owner)).await.unwrap();
        let b = store.insert(new_event("b", at(2, 9), Visibility::Public, owner)).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.owner_id, owner);
    }

    #[tokio::test]
    async fn test_upsert_user_keeps_id() {
        let store = MemoryStore::new();
        let first = store.upsert_user("klub", "hash-1").await.unwrap();
        let second = store.upsert_user("klub", "hash-2").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.find_user("klub").await.unwrap().unwrap().password_hash, "hash-2");
        assert!(store.find_user("nobody").await.unwrap().is_none());
    }
}
