//! Phone Intake Server
//!
//! Accepts carrier media-stream websockets, runs one dialogue session per
//! call, and exposes health and Prometheus endpoints.

pub mod call_control;
pub mod http;
pub mod media_stream;
pub mod metrics;
pub mod registry;
pub mod state;

pub use call_control::{HttpCallControl, LoggingCallControl};
pub use http::create_router;
pub use media_stream::{CarrierEvent, WsEgress};
pub use metrics::init_metrics;
pub use registry::CallRegistry;
pub use state::AppState;

use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Call capacity reached ({0} active)")]
    CapacityExceeded(usize),

    #[error("Call control error: {0}")]
    CallControl(String),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServerError> for axum::http::StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::WebSocket(_) => axum::http::StatusCode::BAD_REQUEST,
            ServerError::Protocol(_) => axum::http::StatusCode::BAD_REQUEST,
            ServerError::CapacityExceeded(_) => axum::http::StatusCode::SERVICE_UNAVAILABLE,
            ServerError::CallControl(_) => axum::http::StatusCode::BAD_GATEWAY,
            ServerError::Metrics(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServerError> for voice_intake_core::Error {
    fn from(err: ServerError) -> Self {
        voice_intake_core::Error::Telephony(err.to_string())
    }
}
