//! HTTP API module
//!
//! The control surface a front-end uses to drive the session: duration
//! inputs, schedule/cancel, presence toggling, window reports and prompt
//! answers.

pub mod context;
pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use context::AppContext;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(context: Arc<AppContext>) -> Router {
    Router::new()
        .route("/input/source", post(source_handler))
        .route("/input/slider", post(slider_handler))
        .route("/input/custom", post(custom_handler))
        .route("/schedule", post(schedule_handler))
        .route("/cancel", post(cancel_handler))
        .route("/presence", post(presence_handler))
        .route("/window/pointer", post(pointer_handler))
        .route("/window/bounds", post(bounds_handler))
        .route("/prompt", get(prompt_handler))
        .route("/prompt/:id", post(answer_handler))
        .route("/theme", post(theme_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(context)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        services::{PromptBoard, RemoteWindow, Theme, ThemeStore},
        state::{Collaborators, Session, SessionSettings},
        testing::{MockShutdown, ShutdownCall, TestClock},
    };

    struct TestApp {
        router: Router,
        context: Arc<AppContext>,
        shutdown: Arc<MockShutdown>,
        _dir: tempfile::TempDir,
    }

    fn test_app() -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let shutdown = Arc::new(MockShutdown::new());
        let prompts = Arc::new(PromptBoard::new(Duration::from_secs(30)));
        let window = Arc::new(RemoteWindow::new());
        let session = Session::new(
            Collaborators {
                shutdown: shutdown.clone(),
                dialogs: prompts.clone(),
                window: window.clone(),
                clock: Arc::new(TestClock::new()),
            },
            SessionSettings::default(),
        );
        session.start();

        let context = Arc::new(AppContext::new(
            session,
            prompts,
            window,
            ThemeStore::new(dir.path()),
            "majid",
            "127.0.0.1".to_string(),
            20554,
        ));
        TestApp {
            router: create_router(Arc::clone(&context)),
            context,
            shutdown,
            _dir: dir,
        }
    }

    async fn send(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app.router.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_and_status() {
        let app = test_app();

        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = send(&app, "GET", "/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["greeting"], "Hello, Majid!");
        assert_eq!(body["theme"], "dark_grey");
        assert_eq!(body["session"]["phase"], "idle");
        assert_eq!(body["session"]["minutes"], 30);
        assert_eq!(body["window"]["view_mode"], "full");
    }

    #[tokio::test]
    async fn inputs_resolve_duration() {
        let app = test_app();

        let (status, body) = send(&app, "POST", "/input/slider", Some(json!({ "value": 44 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session"]["slider"], 30);

        send(&app, "POST", "/input/source", Some(json!({ "source": "custom" }))).await;
        let (_, body) = send(
            &app,
            "POST",
            "/input/custom",
            Some(json!({ "hours": "2", "minutes": "oops" })),
        )
        .await;
        assert_eq!(body["session"]["minutes"], 120);
        assert_eq!(body["session"]["source"], "custom");
    }

    #[tokio::test]
    async fn schedule_and_cancel_round_trip() {
        let app = test_app();

        let (status, body) = send(&app, "POST", "/schedule", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session"]["phase"], "scheduled");
        assert_eq!(body["session"]["view_mode"], "timer_compact");
        assert_eq!(body["session"]["sensing_enabled"], true);
        assert_eq!(body["session"]["total_seconds"], 1800);

        let (status, _) = send(&app, "POST", "/schedule", None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(&app, "POST", "/input/slider", Some(json!({ "value": 60 }))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(&app, "POST", "/cancel", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Shutdown has been cancelled");
        assert_eq!(body["session"]["phase"], "idle");
        assert_eq!(body["session"]["view_mode"], "full");

        let (_, body) = send(&app, "POST", "/cancel", None).await;
        assert_eq!(body["message"], "No shutdown was scheduled");
        assert_eq!(
            app.shutdown.calls(),
            vec![ShutdownCall::Schedule(1800), ShutdownCall::Cancel]
        );

        let (_, body) = send(&app, "GET", "/status", None).await;
        assert_eq!(body["notices"][0]["title"], "Cancelled");
    }

    #[tokio::test]
    async fn immediate_shutdown_waits_for_prompt_answer() {
        let app = test_app();
        send(&app, "POST", "/input/slider", Some(json!({ "value": 0 }))).await;

        let router = app.router.clone();
        let pending = tokio::spawn(async move {
            let request = Request::builder()
                .method("POST")
                .uri("/schedule")
                .body(Body::empty())
                .unwrap();
            router.oneshot(request).await.unwrap().status()
        });

        let prompt = loop {
            if let Some(prompt) = app.context.prompts.pending() {
                break prompt;
            }
            tokio::task::yield_now().await;
        };
        assert_eq!(prompt.message, "Shut down immediately?");

        let (_, body) = send(&app, "GET", "/prompt", None).await;
        assert_eq!(body["prompt"]["id"], prompt.id);

        let uri = format!("/prompt/{}", prompt.id);
        let (status, _) = send(&app, "POST", &uri, Some(json!({ "answer": false }))).await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(pending.await.unwrap(), StatusCode::CONFLICT);
        assert!(app.shutdown.calls().is_empty());

        // The answer's own snapshot may lag; status reflects the settled outcome
        let (_, body) = send(&app, "GET", "/status", None).await;
        assert_eq!(body["session"]["phase"], "idle");
        assert!(body["pending_prompt"].is_null());
    }

    #[tokio::test]
    async fn unknown_prompt_is_not_found() {
        let app = test_app();
        let (status, body) = send(&app, "POST", "/prompt/99", Some(json!({ "answer": true }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn presence_toggles_without_body() {
        let app = test_app();

        let (_, body) = send(&app, "POST", "/presence", None).await;
        assert_eq!(body["session"]["sensing_enabled"], true);

        let (_, body) = send(&app, "POST", "/presence", Some(json!({ "enabled": false }))).await;
        assert_eq!(body["session"]["sensing_enabled"], false);
        assert_eq!(body["message"], "Invisibility disabled");
    }

    #[tokio::test]
    async fn window_reports_feed_the_sensor() {
        let app = test_app();
        send(&app, "POST", "/window/bounds", Some(json!({ "x": 0, "y": 0, "width": 700, "height": 560 }))).await;
        send(&app, "POST", "/window/pointer", Some(json!({ "x": 2000, "y": 2000 }))).await;
        send(&app, "POST", "/presence", Some(json!({ "enabled": true }))).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        let (_, body) = send(&app, "GET", "/status", None).await;
        assert_eq!(body["window"]["opacity"], "hidden");
        assert_eq!(body["session"]["opacity"], "hidden");
    }

    #[tokio::test]
    async fn theme_is_persisted() {
        let app = test_app();
        let (status, _) = send(&app, "POST", "/theme", Some(json!({ "theme": "black" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(app.context.theme(), Theme::Black);
        assert_eq!(app.context.themes.load(), Theme::Black);

        let (status, _) = send(&app, "POST", "/theme", Some(json!({ "theme": "neon" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
