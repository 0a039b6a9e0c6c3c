use axum::http::{header, HeaderMap};
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// The authenticated user a request acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub principal: Principal,
    pub created_at: Instant,
}

impl Session {
    fn is_live(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) < SESSION_TTL
    }
}

/// Opaque session token -> session, held server-side.
pub type Sessions = Arc<RwLock<HashMap<String, Session>>>;

fn prune_expired(sessions: &mut HashMap<String, Session>, now: Instant) {
    let before = sessions.len();
    sessions.retain(|_, session| session.is_live(now));
    let pruned = before - sessions.len();
    if pruned > 0 {
        log::debug!("Pruned {} expired sessions", pruned);
    }
}

pub async fn create_session(principal: Principal, sessions: &Sessions) -> String {
    let session_id = Uuid::new_v4().to_string();
    let now = Instant::now();
    let mut sessions = sessions.write().await;
    prune_expired(&mut sessions, now);
    sessions.insert(
        session_id.clone(),
        Session {
            principal,
            created_at: now,
        },
    );
    session_id
}

/// Resolves the request's session cookie; `None` when absent, unknown or expired.
pub async fn resolve_session(headers: &HeaderMap, sessions: &Sessions) -> Option<Principal> {
    let session_id = extract_session_id(headers)?;
    live_principal(&*sessions.read().await, &session_id, Instant::now())
}

fn live_principal(
    sessions: &HashMap<String, Session>,
    session_id: &str,
    now: Instant,
) -> Option<Principal> {
    sessions
        .get(session_id)
        .filter(|session| session.is_live(now))
        .map(|session| session.principal.clone())
}

pub async fn end_session(headers: &HeaderMap, sessions: &Sessions) -> bool {
    match extract_session_id(headers) {
        Some(session_id) => sessions.write().await.remove(&session_id).is_some(),
        None => false,
    }
}

pub fn session_cookie(session_id: &str) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        SESSION_COOKIE,
        session_id,
        SESSION_TTL.as_secs()
    )
}

pub fn expired_session_cookie() -> String {
    format!("{}=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax", SESSION_COOKIE)
}

fn extract_session_id(headers: &HeaderMap) -> Option<String> {
    let prefix = format!("{}=", SESSION_COOKIE);
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookie_str| cookie_str.split(';'))
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(prefix.as_str()))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
