//! Application State
//!
//! Shared collaborators handed to every call session.

use std::sync::Arc;

use voice_intake_agent::SessionConfig;
use voice_intake_config::Settings;
use voice_intake_core::{CallControl, OutcomeSink, SpeechSynthesizer, TranscriptionProvider};
use voice_intake_persistence::InMemoryOutcomeSink;
use voice_intake_pipeline::{HttpSynthesizer, HttpTranscriber};

use crate::call_control::{HttpCallControl, LoggingCallControl};
use crate::registry::CallRegistry;
use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub session_config: SessionConfig,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub transcriber: Arc<dyn TranscriptionProvider>,
    pub call_control: Arc<dyn CallControl>,
    pub sink: Arc<dyn OutcomeSink>,
    pub calls: Arc<CallRegistry>,
}

impl AppState {
    pub fn new(
        config: Settings,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        transcriber: Arc<dyn TranscriptionProvider>,
        call_control: Arc<dyn CallControl>,
        sink: Arc<dyn OutcomeSink>,
    ) -> Self {
        Self {
            session_config: SessionConfig::from_settings(&config),
            calls: Arc::new(CallRegistry::new(config.server.max_calls)),
            config: Arc::new(config),
            synthesizer,
            transcriber,
            call_control,
            sink,
        }
    }

    /// Wire the HTTP providers, carrier call control and outcome sink from
    /// settings. A persistence failure falls back to the in-memory sink.
    pub async fn build(config: Settings) -> Result<Self, ServerError> {
        let synthesizer = HttpSynthesizer::new(config.speech.clone())
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        let transcriber = HttpTranscriber::new(config.transcription.clone())
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        let call_control: Arc<dyn CallControl> = match &config.telephony.call_control_url {
            Some(url) => Arc::new(HttpCallControl::new(url.clone(), &config.telephony)?),
            None => {
                tracing::warn!("telephony.call_control_url not set, transfer and hangup are logged only");
                Arc::new(LoggingCallControl)
            }
        };

        let sink = match voice_intake_persistence::init(&config.persistence).await {
            Ok(sink) => sink,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to initialize ScyllaDB, falling back to in-memory outcome sink"
                );
                Arc::new(InMemoryOutcomeSink::new()) as Arc<dyn OutcomeSink>
            }
        };

        Ok(Self::new(
            config,
            Arc::new(synthesizer),
            Arc::new(transcriber),
            call_control,
            sink,
        ))
    }
}
