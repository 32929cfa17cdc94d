//! Chunked HTTP transcription
//!
//! Each call gets a background task that buffers inbound frames and posts a
//! recognition request whenever `chunk_bytes` have accumulated. The tail is
//! flushed as a final chunk when the audio sender is dropped.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use voice_intake_config::TranscriptionConfig;
use voice_intake_core::{
    Result as CoreResult, TranscriptEvent, TranscriptionProvider, TranscriptionStream,
};

use crate::{check_status, http_client, PipelineError};

const PROVIDER: &str = "transcription";

/// Inbound frame queue depth (20ms frames)
const AUDIO_QUEUE_FRAMES: usize = 512;
const EVENT_QUEUE: usize = 64;

/// Accumulates audio until a chunk is full
#[derive(Debug)]
pub struct ChunkBuffer {
    chunk_bytes: usize,
    buffer: Vec<u8>,
}

impl ChunkBuffer {
    pub fn new(chunk_bytes: usize) -> Self {
        Self {
            chunk_bytes: chunk_bytes.max(1),
            buffer: Vec::with_capacity(chunk_bytes),
        }
    }

    /// Append a frame; returns a full chunk when one is ready
    pub fn push(&mut self, frame: &[u8]) -> Option<Vec<u8>> {
        self.buffer.extend_from_slice(frame);
        if self.buffer.len() >= self.chunk_bytes {
            Some(std::mem::take(&mut self.buffer))
        } else {
            None
        }
    }

    /// Whatever is left
    pub fn flush(&mut self) -> Option<Vec<u8>> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[derive(Debug, Serialize)]
struct RecognitionRequest<'a> {
    session: &'a str,
    audio: String,
    encoding: &'static str,
    language: &'a str,
    /// Last chunk of the call's audio
    #[serde(rename = "final")]
    last: bool,
}

#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    transcript: String,
    #[serde(default)]
    is_final: bool,
}

impl RecognitionResponse {
    fn into_events(self) -> Vec<TranscriptEvent> {
        self.results
            .into_iter()
            .filter(|r| !r.transcript.trim().is_empty())
            .map(|r| TranscriptEvent::new(r.transcript.trim(), r.is_final))
            .collect()
    }
}

struct Inner {
    config: TranscriptionConfig,
    client: reqwest::Client,
}

impl Inner {
    async fn recognize(
        &self,
        call_id: &str,
        chunk: &[u8],
        last: bool,
    ) -> Result<Vec<TranscriptEvent>, PipelineError> {
        let body = RecognitionRequest {
            session: call_id,
            audio: STANDARD.encode(chunk),
            encoding: self.config.encoding.as_str(),
            language: &self.config.language,
            last,
        };

        let mut request = self.client.post(&self.config.url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = check_status(request.send().await?).await?;
        let parsed: RecognitionResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::InvalidResponse(e.to_string()))?;
        Ok(parsed.into_events())
    }

    /// Returns false once the event receiver is gone
    async fn forward(
        &self,
        call_id: &str,
        chunk: Vec<u8>,
        last: bool,
        events: &mpsc::Sender<CoreResult<TranscriptEvent>>,
    ) -> bool {
        match self.recognize(call_id, &chunk, last).await {
            Ok(batch) => {
                for event in batch {
                    if events.send(Ok(event)).await.is_err() {
                        return false;
                    }
                }
                true
            }
            Err(e) => {
                tracing::warn!(call_id = %call_id, error = %e, "Recognition request failed");
                events.send(Err(e.into_core(PROVIDER))).await.is_ok()
            }
        }
    }

    async fn run(
        self: Arc<Self>,
        call_id: String,
        mut audio: mpsc::Receiver<Vec<u8>>,
        events: mpsc::Sender<CoreResult<TranscriptEvent>>,
    ) {
        let mut buffer = ChunkBuffer::new(self.config.chunk_bytes);

        while let Some(frame) = audio.recv().await {
            if let Some(chunk) = buffer.push(&frame) {
                if !self.forward(&call_id, chunk, false, &events).await {
                    return;
                }
            }
        }

        if let Some(chunk) = buffer.flush() {
            self.forward(&call_id, chunk, true, &events).await;
        }
        tracing::debug!(call_id = %call_id, "Transcription task finished");
    }
}

/// Transcription provider posting chunked audio to an HTTP recognizer
pub struct HttpTranscriber {
    inner: Arc<Inner>,
}

impl HttpTranscriber {
    pub fn new(config: TranscriptionConfig) -> Result<Self, PipelineError> {
        let client = http_client(config.timeout_ms)?;
        tracing::info!(
            url = %config.url,
            language = %config.language,
            chunk_bytes = config.chunk_bytes,
            "HTTP transcriber configured"
        );
        Ok(Self {
            inner: Arc::new(Inner { config, client }),
        })
    }
}

#[async_trait]
impl TranscriptionProvider for HttpTranscriber {
    async fn open(&self, call_id: &str) -> CoreResult<TranscriptionStream> {
        let (audio_tx, audio_rx) = mpsc::channel(AUDIO_QUEUE_FRAMES);
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE);

        tokio::spawn(
            self.inner
                .clone()
                .run(call_id.to_string(), audio_rx, events_tx),
        );

        Ok(TranscriptionStream {
            audio: audio_tx,
            events: Box::pin(ReceiverStream::new(events_rx)),
        })
    }

    fn model_name(&self) -> &str {
        &self.inner.config.language
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn test_chunk_buffer() {
        let mut buffer = ChunkBuffer::new(400);
        assert!(buffer.push(&[0u8; 160]).is_none());
        assert!(buffer.push(&[0u8; 160]).is_none());
        let chunk = buffer.push(&[0u8; 160]).unwrap();
        assert_eq!(chunk.len(), 480);
        assert!(buffer.is_empty());

        buffer.push(&[1u8; 100]);
        assert_eq!(buffer.flush().map(|c| c.len()), Some(100));
        assert!(buffer.flush().is_none());
    }

    #[test]
    fn test_response_to_events() {
        let response: RecognitionResponse = serde_json::from_str(
            r#"{"results":[
                {"transcript":"my brakes","is_final":false},
                {"transcript":"  "},
                {"transcript":" my brakes are grinding ","is_final":true}
            ]}"#,
        )
        .unwrap();

        let events = response.into_events();
        assert_eq!(events.len(), 2);
        assert!(!events[0].is_final);
        assert_eq!(events[1].text, "my brakes are grinding");
        assert!(events[1].is_final);
    }

    #[test]
    fn test_empty_response() {
        let response: RecognitionResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_events().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_provider_surfaces_error() {
        let transcriber = HttpTranscriber::new(TranscriptionConfig {
            url: "http://127.0.0.1:9/transcribe".to_string(),
            timeout_ms: 500,
            chunk_bytes: 320,
            ..Default::default()
        })
        .unwrap();

        let mut stream = transcriber.open("CA1").await.unwrap();
        stream.audio.send(vec![0xff; 320]).await.unwrap();

        let first = stream.events.next().await.unwrap();
        assert!(first.unwrap_err().is_transient());
    }
}
