//! HTTP synthesis provider
//!
//! One POST per line. The provider is asked for audio already in the
//! carrier's wire encoding, so the body is forwarded untouched.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Instant;

use voice_intake_config::SpeechConfig;
use voice_intake_core::{Result as CoreResult, SpeechSynthesizer, SynthesizedAudio};

use crate::{check_status, http_client, PipelineError};

const PROVIDER: &str = "synthesis";

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    voice: &'a str,
    encoding: &'static str,
}

/// Synthesizer backed by an HTTP text-to-speech service
pub struct HttpSynthesizer {
    config: SpeechConfig,
    client: reqwest::Client,
}

impl HttpSynthesizer {
    pub fn new(config: SpeechConfig) -> Result<Self, PipelineError> {
        let client = http_client(config.timeout_ms)?;
        tracing::info!(
            url = %config.url,
            voice = %config.voice,
            encoding = config.encoding.as_str(),
            "HTTP synthesizer configured"
        );
        Ok(Self { config, client })
    }

    async fn request(&self, text: &str) -> Result<Vec<u8>, PipelineError> {
        let body = SynthesisRequest {
            text,
            voice: &self.config.voice,
            encoding: self.config.encoding.as_str(),
        };

        let mut request = self.client.post(&self.config.url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = check_status(request.send().await?).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(PipelineError::InvalidResponse("empty audio body".to_string()));
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSynthesizer {
    async fn synthesize(&self, text: &str) -> CoreResult<SynthesizedAudio> {
        let started = Instant::now();
        let bytes = self
            .request(text)
            .await
            .map_err(|e| e.into_core(PROVIDER))?;

        tracing::debug!(
            chars = text.chars().count(),
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Synthesized line"
        );
        Ok(SynthesizedAudio::new(bytes, self.config.encoding))
    }

    fn model_name(&self) -> &str {
        &self.config.voice
    }
}
