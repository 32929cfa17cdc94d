//! Collaborator traits for the intake engine
//!
//! Every external system the dialogue engine talks to sits behind one of
//! these traits so sessions can run against real providers or test doubles.
//!
//! # Trait Hierarchy
//!
//! ```text
//! Speech:
//!   - SpeechSynthesizer: Text → audio bytes (request/response)
//!   - TranscriptionProvider: audio frames ⇄ transcript events (stream)
//!
//! Telephony:
//!   - AudioEgress: outbound frames + clear-playback signal
//!   - CallControl: transfer to a human, hang up
//!
//! Persistence:
//!   - OutcomeSink: idempotent outcome upsert + at-most-once record creation
//! ```

mod outcome;
mod speech;
mod telephony;

pub use outcome::OutcomeSink;
pub use speech::{SpeechSynthesizer, TranscriptionProvider, TranscriptionStream};
pub use telephony::{AudioEgress, CallControl};
