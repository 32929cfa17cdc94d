//! Transcript events from the transcription provider

use tokio::time::Instant;

/// Raw recognition event as received from the transcription stream
#[derive(Debug, Clone)]
pub struct TranscriptEvent {
    pub text: String,
    pub is_final: bool,
    /// Monotonic arrival time, stamped at ingestion (tokio clock, pausable in tests)
    pub received_at: Instant,
}

impl TranscriptEvent {
    pub fn new(text: impl Into<String>, is_final: bool) -> Self {
        Self {
            text: text.into(),
            is_final,
            received_at: Instant::now(),
        }
    }

    pub fn at(text: impl Into<String>, is_final: bool, received_at: Instant) -> Self {
        Self {
            text: text.into(),
            is_final,
            received_at,
        }
    }
}

/// A debounced caller utterance; consumed once by the session actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub arrived_at: Instant,
}

impl Utterance {
    pub fn new(text: impl Into<String>, arrived_at: Instant) -> Self {
        Self {
            text: text.into(),
            arrived_at,
        }
    }
}
