//! Speech provider traits

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use tokio::sync::mpsc;

use crate::{Result, SynthesizedAudio, TranscriptEvent};

/// Text-to-Speech interface
///
/// Treated as a synchronous request/response call. Callers wrap it with a
/// timeout and bounded retries; implementations should not retry internally.
///
/// # Example
///
/// ```ignore
/// let tts: Arc<dyn SpeechSynthesizer> = Arc::new(HttpSynthesizer::new(config)?);
/// let audio = tts.synthesize("Thanks for calling.").await?;
/// ```
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + 'static {
    /// Synthesize text into audio in the carrier's wire encoding
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio>;

    /// Get provider name for logging
    fn model_name(&self) -> &str;
}

/// An open bidirectional transcription stream for one call
pub struct TranscriptionStream {
    /// Raw inbound audio frames, in arrival order
    pub audio: mpsc::Sender<Vec<u8>>,
    /// Partial and final transcript events
    pub events: Pin<Box<dyn Stream<Item = Result<TranscriptEvent>> + Send>>,
}

/// Speech-to-Text interface
///
/// Opening a stream returns a sender for audio frames and a stream of
/// `{transcript, is_final}` events. Dropping the sender ends the stream.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync + 'static {
    /// Open a transcription stream for a call
    async fn open(&self, call_id: &str) -> Result<TranscriptionStream>;

    /// Get provider name for logging
    fn model_name(&self) -> &str;
}
