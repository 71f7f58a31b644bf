//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::SessionError,
    services::{dialogs::Notice, window::WindowStatus, PendingPrompt, Theme},
    state::SessionSnapshot,
    time_source::TimeSource,
};

#[derive(Debug, Deserialize)]
pub struct SourceRequest {
    pub source: TimeSource,
}

#[derive(Debug, Deserialize)]
pub struct SliderRequest {
    pub value: i64,
}

/// Raw text of the custom fields; anything unparsable counts as zero
#[derive(Debug, Deserialize)]
pub struct CustomRequest {
    #[serde(default)]
    pub hours: String,
    #[serde(default)]
    pub minutes: String,
}

/// `enabled` absent means toggle
#[derive(Debug, Default, Deserialize)]
pub struct PresenceRequest {
    pub enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: bool,
}

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: Theme,
}

/// API response structure for state change endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub session: SessionSnapshot,
}

impl ApiResponse {
    pub fn new(status: &str, message: impl Into<String>, session: SessionSnapshot) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            session,
        }
    }

    pub fn ok(message: impl Into<String>, session: SessionSnapshot) -> Self {
        Self::new("ok", message, session)
    }

    /// The request went through but something non-fatal went wrong
    pub fn warning(message: impl Into<String>, session: SessionSnapshot) -> Self {
        Self::new("warning", message, session)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub greeting: String,
    pub theme: Theme,
    pub session: SessionSnapshot,
    pub window: Option<WindowStatus>,
    pub pending_prompt: Option<PendingPrompt>,
    pub notices: Vec<Notice>,
    pub uptime: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptResponse {
    pub prompt: Option<PendingPrompt>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

/// Session errors as HTTP responses
#[derive(Debug)]
pub enum ApiError {
    Session(SessionError),
    UnknownPrompt(u64),
    Internal(String),
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        ApiError::Session(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Session(error) => {
                let status = match error {
                    SessionError::ScheduleActionFailed(_) | SessionError::CancelActionFailed(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                    SessionError::AlreadyActive
                    | SessionError::Busy
                    | SessionError::ControlsLocked(_)
                    | SessionError::Declined => StatusCode::CONFLICT,
                };
                (status, error.to_string())
            }
            ApiError::UnknownPrompt(id) => (StatusCode::NOT_FOUND, format!("no open prompt with id {}", id)),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!("Request failed ({}): {}", status, message);
        (status, Json(ErrorBody { status: "error", message })).into_response()
    }
}
