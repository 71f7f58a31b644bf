//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    response::Json,
};
use tracing::{error, info};

use super::{
    responses::{
        AnswerRequest, ApiError, ApiResponse, CustomRequest, HealthResponse, PresenceRequest,
        PromptResponse, SliderRequest, SourceRequest, StatusResponse, ThemeRequest,
    },
    AppContext,
};
use crate::state::{CancelOutcome, Point, Rect};

type ApiResult = Result<Json<ApiResponse>, ApiError>;

/// Handle POST /input/source - Switch between slider and custom input
pub async fn source_handler(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<SourceRequest>,
) -> ApiResult {
    let minutes = ctx.session.set_source(body.source);
    Ok(Json(ApiResponse::ok(
        format!("Using {:?} input ({} minutes)", body.source, minutes),
        ctx.session.snapshot(),
    )))
}

/// Handle POST /input/slider - Move the preset slider
pub async fn slider_handler(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<SliderRequest>,
) -> ApiResult {
    let minutes = ctx.session.set_slider(body.value)?;
    Ok(Json(ApiResponse::ok(
        format!("Delay set to {} minutes", minutes),
        ctx.session.snapshot(),
    )))
}

/// Handle POST /input/custom - Update the custom hours/minutes fields
pub async fn custom_handler(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<CustomRequest>,
) -> ApiResult {
    let minutes = ctx.session.set_custom(&body.hours, &body.minutes)?;
    Ok(Json(ApiResponse::ok(
        format!("Delay set to {} minutes", minutes),
        ctx.session.snapshot(),
    )))
}

/// Handle POST /schedule - Schedule a shutdown for the current duration
pub async fn schedule_handler(State(ctx): State<Arc<AppContext>>) -> ApiResult {
    // Run detached so a dropped connection cannot abandon the OS call halfway
    let session = Arc::clone(&ctx.session);
    let result = tokio::spawn(async move { session.request_schedule().await })
        .await
        .map_err(|e| {
            error!("Schedule task failed: {}", e);
            ApiError::Internal(format!("schedule task failed: {}", e))
        })?;
    result?;

    let snapshot = ctx.session.snapshot();
    info!("Schedule endpoint called - shutdown at {}", snapshot.display.shutdown_at);
    Ok(Json(ApiResponse::ok(
        format!("Shutdown scheduled for {}", snapshot.display.shutdown_at),
        snapshot,
    )))
}

/// Handle POST /cancel - Cancel the scheduled shutdown
pub async fn cancel_handler(State(ctx): State<Arc<AppContext>>) -> ApiResult {
    let session = Arc::clone(&ctx.session);
    let outcome = tokio::spawn(async move { session.cancel().await })
        .await
        .map_err(|e| {
            error!("Cancel task failed: {}", e);
            ApiError::Internal(format!("cancel task failed: {}", e))
        })??;

    let snapshot = ctx.session.snapshot();
    let response = match outcome {
        CancelOutcome::NotScheduled => ApiResponse::ok("No shutdown was scheduled", snapshot),
        CancelOutcome::Cancelled { action_error: None } => {
            info!("Cancel endpoint called - shutdown cancelled");
            ApiResponse::ok("Shutdown has been cancelled", snapshot)
        }
        CancelOutcome::Cancelled { action_error: Some(e) } => ApiResponse::warning(
            format!("Shutdown cancelled locally; {}", e),
            snapshot,
        ),
    };
    Ok(Json(response))
}

/// Handle POST /presence - Enable, disable or toggle presence sensing
pub async fn presence_handler(
    State(ctx): State<Arc<AppContext>>,
    body: Option<Json<PresenceRequest>>,
) -> ApiResult {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let enabled = match request.enabled {
        Some(enabled) => ctx.session.set_sensing(enabled),
        None => ctx.session.toggle_sensing(),
    };

    let message = if enabled {
        "Move your mouse away to make me invisible"
    } else {
        "Invisibility disabled"
    };
    Ok(Json(ApiResponse::ok(message, ctx.session.snapshot())))
}

/// Handle POST /window/pointer - Front-end reports the pointer position
pub async fn pointer_handler(
    State(ctx): State<Arc<AppContext>>,
    Json(pointer): Json<Point>,
) -> Json<serde_json::Value> {
    ctx.window.report_pointer(pointer);
    Json(serde_json::json!({ "status": "ok" }))
}

/// Handle POST /window/bounds - Front-end reports the window geometry
pub async fn bounds_handler(
    State(ctx): State<Arc<AppContext>>,
    Json(bounds): Json<Rect>,
) -> Json<serde_json::Value> {
    ctx.window.report_bounds(bounds);
    Json(serde_json::json!({ "status": "ok" }))
}

/// Handle GET /prompt - The confirmation currently waiting for an answer
pub async fn prompt_handler(State(ctx): State<Arc<AppContext>>) -> Json<PromptResponse> {
    Json(PromptResponse {
        prompt: ctx.prompts.pending(),
    })
}

/// Handle POST /prompt/:id - Answer a pending confirmation
///
/// The answer is handed to the waiting transition, which applies it on its
/// own task. The returned snapshot may still show the state from before that
/// transition; clients that need the outcome poll GET /status.
pub async fn answer_handler(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<u64>,
    Json(body): Json<AnswerRequest>,
) -> ApiResult {
    if !ctx.prompts.answer(id, body.answer) {
        return Err(ApiError::UnknownPrompt(id));
    }
    // Best effort only: the transition may run on another worker
    tokio::task::yield_now().await;

    Ok(Json(ApiResponse::ok(
        format!("Prompt {} answered", id),
        ctx.session.snapshot(),
    )))
}

/// Handle POST /theme - Apply and persist a colour theme
pub async fn theme_handler(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<ThemeRequest>,
) -> ApiResult {
    ctx.set_theme(body.theme);
    Ok(Json(ApiResponse::ok(
        format!("Theme set to {:?}", body.theme),
        ctx.session.snapshot(),
    )))
}

/// Handle GET /status - Return the full front-end view
pub async fn status_handler(State(ctx): State<Arc<AppContext>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        greeting: ctx.greeting.clone(),
        theme: ctx.theme(),
        session: ctx.session.snapshot(),
        window: ctx.window.status(),
        pending_prompt: ctx.prompts.pending(),
        notices: ctx.prompts.notices(),
        uptime: ctx.uptime(),
        host: ctx.host.clone(),
        port: ctx.port,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
