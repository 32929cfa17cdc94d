//! Speech player with barge-in
//!
//! `speak` synthesizes a line (timeout + bounded retries), streams the audio
//! to the carrier in 20ms frames and opens a speaking window sized from the
//! text length. The window is a deadline, not a flag: it simply expires, and
//! [`SpeechPlayer::barge_in`] truncates it after clearing carrier playback.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};

use voice_intake_config::{DialogueConfig, SpeechConfig};
use voice_intake_core::{AudioEgress, Error, Result, SpeechSynthesizer, SynthesizedAudio};

use crate::metrics;

/// How a `speak` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechOutcome {
    /// Line synthesized and sent
    Played,
    /// Line failed; the apology was played instead
    Degraded,
    /// Nothing could be played; the window was released quickly
    Failed,
}

/// Speaking-window and retry settings
#[derive(Debug, Clone)]
pub struct SpeechPlayerConfig {
    pub dialogue: DialogueConfig,
    pub speech: SpeechConfig,
    /// Spoken when every synthesis attempt for a line fails
    pub apology: String,
}

pub struct SpeechPlayer {
    call_id: String,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    egress: Arc<dyn AudioEgress>,
    config: SpeechPlayerConfig,
    speaking_until: Option<Instant>,
}

impl SpeechPlayer {
    pub fn new(
        call_id: impl Into<String>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        egress: Arc<dyn AudioEgress>,
        config: SpeechPlayerConfig,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            synthesizer,
            egress,
            config,
            speaking_until: None,
        }
    }

    /// End of the current (or most recent) speaking window
    pub fn speaking_until(&self) -> Option<Instant> {
        self.speaking_until
    }

    pub fn is_speaking(&self, now: Instant) -> bool {
        self.speaking_until.is_some_and(|until| now < until)
    }

    /// Estimated time to speak `text`
    pub fn estimate(&self, text: &str) -> Duration {
        self.config.dialogue.estimate_speech(text)
    }

    /// Speak one line. Never fails: synthesis errors degrade to the apology
    /// line, and if that fails too the speaking window is released quickly.
    pub async fn speak(&mut self, text: &str) -> SpeechOutcome {
        let synthesized = self.synthesize_with_retry(text).await;
        match synthesized {
            Ok(audio) => match self.play(&audio, text).await {
                Ok(()) => SpeechOutcome::Played,
                Err(e) => {
                    tracing::warn!(call_id = %self.call_id, error = %e, "Outbound audio failed");
                    self.release_quickly();
                    SpeechOutcome::Failed
                }
            },
            Err(e) => {
                tracing::warn!(
                    call_id = %self.call_id,
                    error = %e,
                    provider = self.synthesizer.model_name(),
                    "Synthesis failed after retries, trying apology"
                );
                self.speak_apology().await
            }
        }
    }

    /// Caller spoke over us: clear queued playback and close the window.
    /// Returns whether playback was actually interrupted.
    pub async fn barge_in(&mut self, now: Instant) -> Result<bool> {
        if !self.is_speaking(now) {
            return Ok(false);
        }

        metrics::record_barge_in();
        tracing::debug!(call_id = %self.call_id, "Barge-in, clearing playback");
        self.speaking_until = Some(now);
        self.egress.clear_playback(&self.call_id).await?;
        Ok(true)
    }

    async fn speak_apology(&mut self) -> SpeechOutcome {
        let apology = self.config.apology.clone();
        let attempt =
            timeout(self.config.speech.timeout(), self.synthesizer.synthesize(&apology)).await;

        let played = match attempt {
            Ok(Ok(audio)) if !audio.is_empty() => self.play(&audio, &apology).await.is_ok(),
            _ => false,
        };

        metrics::record_speech_failure(played);
        if played {
            SpeechOutcome::Degraded
        } else {
            tracing::error!(call_id = %self.call_id, "Apology synthesis failed, releasing turn");
            self.release_quickly();
            SpeechOutcome::Failed
        }
    }

    async fn synthesize_with_retry(&self, text: &str) -> Result<SynthesizedAudio> {
        let speech = &self.config.speech;
        let mut last_error = Error::Timeout("synthesis");

        for attempt in 0..=speech.max_retries {
            if attempt > 0 {
                sleep(speech.backoff(attempt)).await;
            }

            let started = Instant::now();
            match timeout(speech.timeout(), self.synthesizer.synthesize(text)).await {
                Ok(Ok(audio)) if !audio.is_empty() => {
                    metrics::record_synthesis_latency(started.elapsed().as_secs_f64());
                    return Ok(audio);
                }
                Ok(Ok(_)) => {
                    last_error = Error::provider("synthesis", "empty audio");
                }
                Ok(Err(e)) if e.is_transient() => {
                    last_error = e;
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    last_error = Error::Timeout("synthesis");
                }
            }

            tracing::debug!(
                call_id = %self.call_id,
                attempt = attempt + 1,
                error = %last_error,
                "Synthesis attempt failed"
            );
        }

        Err(last_error)
    }

    async fn play(&mut self, audio: &SynthesizedAudio, text: &str) -> Result<()> {
        let started = Instant::now();
        self.speaking_until = Some(started + self.estimate(text));

        for frame in audio.frames() {
            self.egress.send_audio(&self.call_id, frame).await?;
        }
        Ok(())
    }

    fn release_quickly(&mut self) {
        let release = Duration::from_millis(self.config.speech.failure_release_ms);
        self.speaking_until = Some(Instant::now() + release);
    }
}

impl std::fmt::Debug for SpeechPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechPlayer")
            .field("call_id", &self.call_id)
            .field("speaking_until", &self.speaking_until)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use voice_intake_core::AudioEncoding;

    struct FlakySynth {
        failures_before_success: u32,
        calls: AtomicU32,
        fail_apology: bool,
    }

    #[async_trait]
    impl SpeechSynthesizer for FlakySynth {
        async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if text.starts_with("Sorry") {
                if self.fail_apology {
                    return Err(Error::provider("test", "down"));
                }
                return Ok(SynthesizedAudio::new(vec![1; 320], AudioEncoding::Mulaw8k));
            }
            if n < self.failures_before_success {
                Err(Error::provider("test", "503"))
            } else {
                Ok(SynthesizedAudio::new(vec![0; 400], AudioEncoding::Mulaw8k))
            }
        }

        fn model_name(&self) -> &str {
            "flaky"
        }
    }

    #[derive(Default)]
    struct RecordingEgress {
        log: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AudioEgress for RecordingEgress {
        async fn send_audio(&self, _call_id: &str, frame: &[u8]) -> Result<()> {
            self.log.lock().push(format!("frame:{}", frame.len()));
            Ok(())
        }

        async fn clear_playback(&self, _call_id: &str) -> Result<()> {
            self.log.lock().push("clear".to_string());
            Ok(())
        }
    }

    fn player(synth: FlakySynth, egress: Arc<RecordingEgress>) -> SpeechPlayer {
        SpeechPlayer::new(
            "call-1",
            Arc::new(synth),
            egress,
            SpeechPlayerConfig {
                dialogue: DialogueConfig::default(),
                speech: SpeechConfig::default(),
                apology: "Sorry, call the shop directly.".to_string(),
            },
        )
    }

    fn synth(failures: u32, fail_apology: bool) -> FlakySynth {
        FlakySynth {
            failures_before_success: failures,
            calls: AtomicU32::new(0),
            fail_apology,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_speak_sends_frames_and_opens_window() {
        let egress = Arc::new(RecordingEgress::default());
        let mut player = player(synth(0, false), egress.clone());

        let outcome = player.speak("What's your zip code?").await;
        assert_eq!(outcome, SpeechOutcome::Played);
        assert_eq!(*egress.log.lock(), vec!["frame:160", "frame:160", "frame:80"]);

        let now = Instant::now();
        assert!(player.is_speaking(now));
        assert_eq!(player.speaking_until(), Some(now + Duration::from_millis(1365)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_then_plays() {
        let egress = Arc::new(RecordingEgress::default());
        let mut player = player(synth(2, false), egress.clone());
        assert_eq!(player.speak("What's your name?").await, SpeechOutcome::Played);
    }

    #[tokio::test(start_paused = true)]
    async fn test_degrades_to_apology() {
        let egress = Arc::new(RecordingEgress::default());
        let mut player = player(synth(10, false), egress.clone());
        assert_eq!(player.speak("What's your name?").await, SpeechOutcome::Degraded);
        assert_eq!(*egress.log.lock(), vec!["frame:160", "frame:160"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_failure_releases_quickly() {
        let egress = Arc::new(RecordingEgress::default());
        let mut player = player(synth(10, true), egress.clone());
        assert_eq!(player.speak("What's your name?").await, SpeechOutcome::Failed);

        let release = Duration::from_millis(SpeechConfig::default().failure_release_ms);
        assert_eq!(player.speaking_until(), Some(Instant::now() + release));
        assert!(egress.log.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_barge_in_clears_only_while_speaking() {
        let egress = Arc::new(RecordingEgress::default());
        let mut player = player(synth(0, false), egress.clone());
        player.speak("Is the car safe to drive right now?").await;

        let now = Instant::now();
        assert!(player.barge_in(now).await.unwrap());
        assert!(!player.is_speaking(now));
        assert_eq!(egress.log.lock().last().map(String::as_str), Some("clear"));

        // Window already closed
        assert!(!player.barge_in(now).await.unwrap());
    }
}
