//! Core traits and types for the phone intake agent
//!
//! This crate provides foundational types used across all other crates:
//! - Call identity, lifecycle and disposition types
//! - Transcript events and debounced utterances
//! - Outcome records handed to the outcome sink
//! - Collaborator traits (synthesis, transcription, telephony, outcome sink)
//! - Error types

pub mod audio;
pub mod call;
pub mod error;
pub mod outcome;
pub mod slots;
pub mod traits;
pub mod transcript;

pub use audio::{AudioEncoding, SynthesizedAudio};
pub use call::{CallInfo, CallLifecycle, Disposition, UNKNOWN_CALLER};
pub use error::{Error, Result};
pub use outcome::{DialogueSnapshot, OutcomePatch, OutcomeRecord, OutcomeStatus};
pub use slots::{IssueCategory, SlotKind, UrgencyWindow};
pub use transcript::{TranscriptEvent, Utterance};

pub use traits::{
    AudioEgress, CallControl, OutcomeSink, SpeechSynthesizer, TranscriptionProvider,
    TranscriptionStream,
};
