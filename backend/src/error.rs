use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Failures surfaced to timetable callers as an HTTP status plus message.
#[derive(Error, Debug)]
pub enum TimetableError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    InvalidRange(String),

    #[error("Not logged in")]
    Unauthorized,

    #[error("No user for view=mine")]
    NoOwner,

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TimetableError {
    pub fn status(&self) -> StatusCode {
        match self {
            TimetableError::InvalidInput(_) | TimetableError::InvalidRange(_) => {
                StatusCode::BAD_REQUEST
            }
            TimetableError::Unauthorized | TimetableError::NoOwner => StatusCode::UNAUTHORIZED,
            TimetableError::Storage(_) | TimetableError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for TimetableError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            TimetableError::Storage(err) => {
                log::error!("Storage failure: {}", err);
                "Internal server error".to_string()
            }
            TimetableError::Internal(err) => {
                log::error!("Internal failure: {}", err);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Stored tag text that is not a JSON array of strings. Never leaves the tag filter.
#[derive(Error, Debug)]
#[error("Malformed tag data: {0}")]
pub struct MalformedTagData(pub String);
