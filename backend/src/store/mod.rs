use async_trait::async_trait;
use uuid::Uuid;

use crate::error::TimetableError;
use crate::models::{NewEvent, TimeRange, TimetableEvent, User, ViewMode};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events with `startAt` in `range`, ascending by `startAt`.
    ///
    /// `Mine` requires an owner. `All` returns public events plus the owner's
    /// own, or public events only when there is no owner.
    async fn query(
        &self,
        range: TimeRange,
        owner: Option<Uuid>,
        mode: ViewMode,
    ) -> Result<Vec<TimetableEvent>, TimetableError>;

    async fn insert(&self, event: NewEvent) -> Result<TimetableEvent, TimetableError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, username: &str) -> Result<Option<User>, TimetableError>;

    /// Creates the user or replaces its password hash.
    async fn upsert_user(&self, username: &str, password_hash: &str) -> Result<User, TimetableError>;
}

pub trait Store: EventStore + UserStore {}

impl<T: EventStore + UserStore> Store for T {}

pub(crate) fn check_query(range: &TimeRange, owner: Option<Uuid>, mode: ViewMode) -> Result<(), TimetableError> {
    if range.from > range.to {
        return Err(TimetableError::InvalidRange("from must not be after to".to_string()));
    }
    if mode == ViewMode::Mine && owner.is_none() {
        return Err(TimetableError::NoOwner);
    }
    Ok(())
}
