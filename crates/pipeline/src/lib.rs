//! Speech provider adapters
//!
//! Implements the core speech traits against HTTP providers:
//! - [`HttpSynthesizer`]: text → carrier-encoded audio, one request per line
//! - [`HttpTranscriber`]: buffers inbound frames into chunks and posts each
//!   chunk for recognition, yielding `{transcript, is_final}` events

pub mod stt;
pub mod tts;

pub use stt::{ChunkBuffer, HttpTranscriber};
pub use tts::HttpSynthesizer;

use thiserror::Error;
use voice_intake_core::Error as CoreError;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Provider timed out")]
    Timeout,

    #[error("Client setup failed: {0}")]
    Setup(String),
}

impl PipelineError {
    /// Map into the shared taxonomy. Timeouts and non-2xx responses stay
    /// transient so callers retry them.
    pub fn into_core(self, provider: &'static str) -> CoreError {
        match self {
            PipelineError::Timeout => CoreError::Timeout(provider),
            PipelineError::Http(e) if e.is_timeout() => CoreError::Timeout(provider),
            PipelineError::Setup(message) => CoreError::Config(message),
            other => CoreError::provider(provider, other.to_string()),
        }
    }
}

/// Build the shared HTTP client for a provider
pub(crate) fn http_client(timeout_ms: u64) -> Result<reqwest::Client, PipelineError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| PipelineError::Setup(format!("Failed to create HTTP client: {}", e)))
}

/// Turn a non-2xx response into [`PipelineError::Status`]
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, PipelineError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(PipelineError::Status {
        status: status.as_u16(),
        body: body.chars().take(200).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            PipelineError::Timeout.into_core("synthesis"),
            CoreError::Timeout("synthesis")
        ));

        let status = PipelineError::Status {
            status: 503,
            body: "busy".to_string(),
        }
        .into_core("synthesis");
        assert!(status.is_transient());
        assert!(status.to_string().contains("503"));

        let setup = PipelineError::Setup("bad tls".to_string()).into_core("transcription");
        assert!(!setup.is_transient());
    }
}
