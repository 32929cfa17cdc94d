//! Dialogue State Tracking for intake calls
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     DialogueState                           │
//! │  - slot values (issue, car, name, zip, phone, ...)          │
//! │  - Phase: explicit tagged state machine position            │
//! │  - correcting_field / asked_followup / record_emitted       │
//! └─────────────────────────────────────────────────────────────┘
//!                               │ mutated only by
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     DialoguePolicy                          │
//! │  - one transition function per utterance                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `DialogueState` is owned by exactly one session actor and never shared,
//! so it carries no locks.

mod phase;
mod state;

pub use phase::{Phase, Step};
pub use state::DialogueState;
