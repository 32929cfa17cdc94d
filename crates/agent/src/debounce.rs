//! Transcript debouncer
//!
//! Coalesces final recognition events into at most one pending utterance
//! (last wins) and decides when it may be dispatched:
//!
//! - never while the session is busy with a turn
//! - not before the grace period after the system's last utterance ends
//! - not before the settle window after the latest final event
//!
//! The debouncer is a plain value driven with explicit instants so it can be
//! tested without a runtime.

use std::time::Duration;
use tokio::time::Instant;

use voice_intake_config::DialogueConfig;
use voice_intake_core::{TranscriptEvent, Utterance};
use voice_intake_text_processing::normalize_utterance;

/// Debounce timing
#[derive(Debug, Clone, Copy)]
pub struct DebounceConfig {
    /// Quiet time after system speech before input is acted on
    pub grace: Duration,
    /// Identical finals within this window are recognizer duplicates
    pub duplicate_window: Duration,
    /// Quiet time after the latest final before it is dispatched
    pub settle_window: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self::from(&DialogueConfig::default())
    }
}

impl From<&DialogueConfig> for DebounceConfig {
    fn from(config: &DialogueConfig) -> Self {
        Self {
            grace: config.grace(),
            duplicate_window: config.duplicate_window(),
            settle_window: config.settle_window(),
        }
    }
}

/// What happened to an incoming transcript event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Partial or empty result
    Ignored,
    /// Same text as the last accepted utterance, inside the duplicate window
    Duplicate,
    /// Stored as the pending utterance; `superseded` if it replaced one
    Pending { superseded: bool },
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Pending { .. })
    }
}

#[derive(Debug)]
pub struct Debouncer {
    config: DebounceConfig,
    pending: Option<Utterance>,
    last_accepted: Option<(String, Instant)>,
    last_delivered_at: Option<Instant>,
}

impl Debouncer {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            pending: None,
            last_accepted: None,
            last_delivered_at: None,
        }
    }

    pub fn on_transcript(&mut self, event: &TranscriptEvent) -> Admission {
        if !event.is_final {
            return Admission::Ignored;
        }

        let normalized = normalize_utterance(&event.text);
        if normalized.is_empty() {
            return Admission::Ignored;
        }

        if let Some((last_text, accepted_at)) = &self.last_accepted {
            let within_window = event
                .received_at
                .saturating_duration_since(*accepted_at)
                < self.config.duplicate_window;
            if *last_text == normalized && within_window {
                return Admission::Duplicate;
            }
        }

        let superseded = self.pending.is_some();
        self.pending = Some(Utterance::new(event.text.trim(), event.received_at));
        self.last_accepted = Some((normalized, event.received_at));

        Admission::Pending { superseded }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_delivered_at(&self) -> Option<Instant> {
        self.last_delivered_at
    }

    /// Earliest instant the pending utterance may be dispatched.
    ///
    /// `speech_ends_at` is the end of the system's most recent utterance
    /// (possibly still in the future while speaking).
    pub fn ready_at(&self, speech_ends_at: Option<Instant>) -> Option<Instant> {
        let pending = self.pending.as_ref()?;
        let settled = pending.arrived_at + self.config.settle_window;
        Some(match speech_ends_at {
            Some(end) => settled.max(end + self.config.grace),
            None => settled,
        })
    }

    /// Take the pending utterance if it is eligible at `now`
    pub fn take_ready(
        &mut self,
        busy: bool,
        speech_ends_at: Option<Instant>,
        now: Instant,
    ) -> Option<Utterance> {
        if busy {
            return None;
        }
        let ready_at = self.ready_at(speech_ends_at)?;
        if now < ready_at {
            return None;
        }

        self.last_delivered_at = Some(now);
        self.pending.take()
    }

    /// Drop anything pending (session ending)
    pub fn clear(&mut self) {
        self.pending = None;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DebounceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn final_at(text: &str, at: Instant) -> TranscriptEvent {
        TranscriptEvent::at(text, true, at)
    }

    #[test]
    fn test_partials_ignored() {
        let mut debouncer = Debouncer::default();
        let event = TranscriptEvent::at("my bra", false, Instant::now());
        assert_eq!(debouncer.on_transcript(&event), Admission::Ignored);
        assert!(!debouncer.has_pending());
    }

    #[test]
    fn test_last_wins_while_busy() {
        let mut debouncer = Debouncer::default();
        let t0 = Instant::now();

        debouncer.on_transcript(&final_at("first thing", t0));
        let admission = debouncer.on_transcript(&final_at("second thing", t0 + ms(100)));
        assert_eq!(admission, Admission::Pending { superseded: true });

        // Busy: nothing dispatched
        assert!(debouncer.take_ready(true, None, t0 + ms(2000)).is_none());

        let utterance = debouncer.take_ready(false, None, t0 + ms(2000)).unwrap();
        assert_eq!(utterance.text, "second thing");
        assert!(!debouncer.has_pending());
        assert_eq!(debouncer.last_delivered_at(), Some(t0 + ms(2000)));
    }

    #[test]
    fn test_grace_after_speech() {
        let mut debouncer = Debouncer::default();
        let t0 = Instant::now();
        let speech_end = t0 + ms(1000);

        debouncer.on_transcript(&final_at("hello there friend", t0 + ms(500)));
        assert!(debouncer.take_ready(false, Some(speech_end), t0 + ms(1500)).is_none());
        assert_eq!(debouncer.ready_at(Some(speech_end)), Some(t0 + ms(1800)));
        assert!(debouncer.take_ready(false, Some(speech_end), t0 + ms(1800)).is_some());
    }

    #[test]
    fn test_settle_window() {
        let mut debouncer = Debouncer::default();
        let t0 = Instant::now();
        debouncer.on_transcript(&final_at("02321", t0));
        assert!(debouncer.take_ready(false, None, t0 + ms(100)).is_none());
        assert!(debouncer.take_ready(false, None, t0 + ms(250)).is_some());
    }

    #[test]
    fn test_duplicate_suppression_window() {
        let mut debouncer = Debouncer::default();
        let t0 = Instant::now();

        debouncer.on_transcript(&final_at("Yes.", t0));
        assert_eq!(
            debouncer.on_transcript(&final_at("yes", t0 + ms(600))),
            Admission::Duplicate
        );
        // Outside the window the same words are a new utterance
        assert!(debouncer
            .on_transcript(&final_at("yes", t0 + ms(1600)))
            .is_accepted());
    }

    #[test]
    fn test_duplicate_window_resets_on_new_utterance() {
        let mut debouncer = Debouncer::default();
        let t0 = Instant::now();

        debouncer.on_transcript(&final_at("yes", t0));
        debouncer.on_transcript(&final_at("no", t0 + ms(200)));
        // "yes" again is no longer identical to the previous utterance
        assert!(debouncer
            .on_transcript(&final_at("yes", t0 + ms(400)))
            .is_accepted());
    }
}
