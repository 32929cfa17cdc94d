//! HTTP Endpoints
//!
//! Health, Prometheus scrape and the carrier media-stream upgrade.

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::media_stream::media_stream_handler;
use crate::metrics::metrics_handler;
use crate::registry::LiveCall;
use crate::state::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let media_path = state.config.server.media_path.clone();

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route(&media_path, get(media_stream_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    active_calls: usize,
    capacity: usize,
    calls: Vec<LiveCall>,
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_calls: state.calls.len(),
        capacity: state.config.server.max_calls,
        calls: state.calls.live_calls(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use voice_intake_config::Settings;
    use voice_intake_persistence::InMemoryOutcomeSink;
    use voice_intake_pipeline::{HttpSynthesizer, HttpTranscriber};

    use crate::call_control::LoggingCallControl;

    fn test_state() -> AppState {
        let settings = Settings::default();
        AppState::new(
            settings.clone(),
            Arc::new(HttpSynthesizer::new(settings.speech.clone()).unwrap()),
            Arc::new(HttpTranscriber::new(settings.transcription.clone()).unwrap()),
            Arc::new(LoggingCallControl),
            Arc::new(InMemoryOutcomeSink::new()),
        )
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_live_calls() {
        let state = test_state();
        let (tx, _rx) = mpsc::channel(4);
        state.calls.register("CA1", "+16175550123", tx).unwrap();

        let (status, body) = get_json(create_router(state), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["active_calls"], 1);
        assert_eq!(body["calls"][0]["call_id"], "CA1");
    }

    #[tokio::test]
    async fn test_media_path_requires_upgrade() {
        let state = test_state();
        let path = state.config.server.media_path.clone();
        let response = create_router(state)
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }
}
