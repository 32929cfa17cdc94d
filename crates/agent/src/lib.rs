//! Turn-taking dialogue engine for phone intake calls
//!
//! Features:
//! - Per-call session actor with a single-writer dialogue state
//! - Deterministic question policy with a confirmation and correction loop
//! - Transcript debouncing (duplicates, last-wins, post-speech grace)
//! - Speech playback with barge-in, retries and an apology fallback
//! - Exactly-once record emission and a single terminal outcome per call

pub mod debounce;
pub mod dst;
pub mod metrics;
pub mod policy;
pub mod session;
pub mod speech_player;

pub use debounce::{Admission, DebounceConfig, Debouncer};
pub use dst::{DialogueState, Phase, Step};
pub use policy::{DialoguePolicy, PolicyAction};
pub use session::{
    forward_transcripts, CallSession, SessionConfig, SessionDeps, SessionEvent, SessionHandle,
    SessionReport,
};
pub use speech_player::{SpeechOutcome, SpeechPlayer, SpeechPlayerConfig};

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Session error: {0}")]
    Session(String),

    #[error("Session channel closed")]
    ChannelClosed,

    #[error(transparent)]
    Core(#[from] voice_intake_core::Error),
}
