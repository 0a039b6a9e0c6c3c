use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};
use tower_http::limit::RequestBodyLimitLayer;

use crate::auth::{
    create_session, end_session, expired_session_cookie, resolve_session, session_cookie,
    Principal, Sessions,
};
use crate::calendar::{grid_range, parse_month};
use crate::config::create_cors_layer;
use crate::crypto::{dummy_hash, verify_passcode};
use crate::error::TimetableError;
use crate::models::{CreateEventRequest, ListEventsQuery, ViewMode};
use crate::service::TimetableService;
use crate::store::UserStore;
use crate::tags::parse_tag_query;
use crate::view::{day_cells, month_label};

pub type AppState = Arc<AppData>;

pub struct AppData {
    pub service: TimetableService,
    pub sessions: Sessions,
}

pub fn is_valid_account(account: &str) -> bool {
    static ACCOUNT_PATTERN: OnceLock<Regex> = OnceLock::new();
    ACCOUNT_PATTERN
        .get_or_init(|| Regex::new(r"^[a-z0-9_-]{1,50}$").expect("account pattern compiles"))
        .is_match(account)
}

pub fn build_router(state: AppState, cors_origins: &[String], body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/api/login", get(login_info).post(login))
        .route("/api/logout", post(logout))
        .route("/api/timetable", get(list_timetable).post(create_timetable))
        .route("/api/timetable/calendar", get(calendar))
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(create_cors_layer(cors_origins))
        .with_state(state)
}

async fn login_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Use POST to login" }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username")]
    account: Option<String>,
    #[serde(alias = "password")]
    passcode: Option<String>,
}

fn invalid_credentials() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "error": "Invalid credentials" })),
    )
        .into_response()
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = body else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Bad request" })),
        )
            .into_response();
    };

    let account = req.account.unwrap_or_default().trim().to_lowercase();
    let passcode = req.passcode.unwrap_or_default().trim().to_string();

    let dummy = match dummy_hash().await {
        Ok(hash) => hash,
        Err(err) => return err.into_response(),
    };

    if !is_valid_account(&account) || passcode.contains('\0') {
        let _ = verify_passcode(&passcode, dummy).await;
        return invalid_credentials();
    }

    let user = match state.service.store().find_user(&account).await {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    let hash = user.as_ref().map_or(dummy, |u| u.password_hash.as_str());
    let passcode_valid = verify_passcode(&passcode, hash).await.unwrap_or(false);

    match user {
        Some(user) if passcode_valid => {
            let session_id = create_session(
                Principal {
                    user_id: user.id,
                    username: user.username.clone(),
                },
                &state.sessions,
            )
            .await;
            log::info!("User {} logged in", user.username);
            (
                [(header::SET_COOKIE, session_cookie(&session_id))],
                Json(serde_json::json!({ "ok": true })),
            )
                .into_response()
        }
        _ => {
            log::info!("Rejected login for account '{}'", account);
            invalid_credentials()
        }
    }
}

pub async fn logout(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Response, TimetableError> {
    if !end_session(&headers, &state.sessions).await {
        return Err(TimetableError::Unauthorized);
    }
    Ok((
        [(header::SET_COOKIE, expired_session_cookie())],
        Json(serde_json::json!({ "ok": true })),
    )
        .into_response())
}

pub async fn list_timetable(
    headers: HeaderMap,
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<serde_json::Value>, TimetableError> {
    let principal = resolve_session(&headers, &state.sessions).await;
    let events = state.service.list_events(principal.as_ref(), &query).await?;
    Ok(Json(serde_json::json!({ "events": events })))
}

pub async fn create_timetable(
    headers: HeaderMap,
    State(state): State<AppState>,
    body: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, TimetableError> {
    let principal = resolve_session(&headers, &state.sessions)
        .await
        .ok_or(TimetableError::Unauthorized)?;
    let Json(req) = body.map_err(|rejection| {
        TimetableError::InvalidInput(format!("Invalid body: {}", rejection.body_text()))
    })?;

    let event = state.service.create_event(Some(&principal), req).await?;
    Ok(Json(serde_json::json!({ "event": event })))
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    month: Option<String>,
    tags: Option<String>,
    view: Option<String>,
}

pub async fn calendar(
    headers: HeaderMap,
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<serde_json::Value>, TimetableError> {
    let invalid_month = || TimetableError::InvalidRange("Invalid month".to_string());
    let month = match query.month.as_deref().filter(|m| !m.trim().is_empty()) {
        Some(value) => parse_month(value).ok_or_else(invalid_month)?,
        None => crate::calendar::start_of_month(Utc::now().date_naive()),
    };

    let principal = resolve_session(&headers, &state.sessions).await;
    let range = grid_range(month).ok_or_else(invalid_month)?;
    let tags = parse_tag_query(query.tags.as_deref().unwrap_or(""));
    let mode = ViewMode::parse(query.view.as_deref());
    let events = state
        .service
        .events_in_range(principal.as_ref(), range, &tags, mode)
        .await?;
    let days = day_cells(month, &events).ok_or_else(invalid_month)?;

    Ok(Json(serde_json::json!({
        "month": month,
        "label": month_label(month),
        "from": range.from,
        "to": range.to,
        "days": days,
    })))
}
