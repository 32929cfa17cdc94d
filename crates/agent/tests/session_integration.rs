//! End-to-end tests for the call session actor
//!
//! Collaborators are in-memory fakes sharing one ordered event log, and the
//! tokio clock is paused so speaking windows and grace periods elapse
//! instantly and deterministically.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use voice_intake_agent::{CallSession, SessionConfig, SessionDeps, SessionEvent, SessionHandle};
use voice_intake_core::{
    AudioEgress, AudioEncoding, CallControl, CallInfo, CallLifecycle, Disposition, Error,
    IssueCategory, OutcomePatch, OutcomeRecord, OutcomeSink, OutcomeStatus, Result,
    SpeechSynthesizer, SynthesizedAudio, TranscriptEvent, UrgencyWindow,
};

const CALLER: &str = "+16175550123";

#[derive(Default)]
struct Log {
    events: Mutex<Vec<String>>,
}

impl Log {
    fn push(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    fn snapshot(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    fn spoken(&self) -> Vec<String> {
        self.snapshot()
            .into_iter()
            .filter_map(|e| e.strip_prefix("say:").map(str::to_string))
            .collect()
    }

    fn count(&self, event: &str) -> usize {
        self.events.lock().iter().filter(|e| *e == event).count()
    }

    fn position(&self, predicate: impl Fn(&str) -> bool) -> Option<usize> {
        self.events.lock().iter().position(|e| predicate(e))
    }
}

struct FakeSynth(Arc<Log>);

#[async_trait]
impl SpeechSynthesizer for FakeSynth {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio> {
        self.0.push(format!("say:{}", text));
        Ok(SynthesizedAudio::new(vec![0xff; 320], AudioEncoding::Mulaw8k))
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}

struct FakeEgress(Arc<Log>);

#[async_trait]
impl AudioEgress for FakeEgress {
    async fn send_audio(&self, _call_id: &str, _frame: &[u8]) -> Result<()> {
        Ok(())
    }

    async fn clear_playback(&self, _call_id: &str) -> Result<()> {
        self.0.push("clear");
        Ok(())
    }
}

struct FakeCallControl(Arc<Log>);

#[async_trait]
impl CallControl for FakeCallControl {
    async fn transfer_to_human(&self, _call_id: &str) -> Result<()> {
        self.0.push("transfer");
        Ok(())
    }

    async fn hangup(&self, _call_id: &str) -> Result<()> {
        self.0.push("hangup");
        Ok(())
    }
}

#[derive(Default)]
struct FakeSink {
    log: Arc<Log>,
    fail: AtomicBool,
    patches: Mutex<Vec<OutcomePatch>>,
    records: Mutex<Vec<OutcomeRecord>>,
}

impl FakeSink {
    fn terminal_patches(&self) -> Vec<OutcomePatch> {
        self.patches
            .lock()
            .iter()
            .filter(|p| p.status != OutcomeStatus::InProgress)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl OutcomeSink for FakeSink {
    async fn upsert_outcome(&self, _call_id: &str, patch: &OutcomePatch) -> Result<()> {
        self.log.push("upsert");
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Sink("store unavailable".to_string()));
        }
        self.patches.lock().push(patch.clone());
        Ok(())
    }

    async fn create_record(&self, record: &OutcomeRecord) -> Result<String> {
        self.log.push("create_record");
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Sink("store unavailable".to_string()));
        }
        self.records.lock().push(record.clone());
        Ok(format!("rec-{}", self.records.lock().len()))
    }
}

struct Harness {
    log: Arc<Log>,
    sink: Arc<FakeSink>,
    handle: SessionHandle,
}

impl Harness {
    fn start() -> Self {
        Self::start_with(FakeSink::default())
    }

    fn start_with(mut sink: FakeSink) -> Self {
        let log = Arc::new(Log::default());
        sink.log = log.clone();
        let sink = Arc::new(sink);

        let deps = SessionDeps {
            synthesizer: Arc::new(FakeSynth(log.clone())),
            egress: Arc::new(FakeEgress(log.clone())),
            call_control: Arc::new(FakeCallControl(log.clone())),
            sink: sink.clone(),
        };
        let info = CallInfo::new("CA123", "MZ456", Some(CALLER.to_string()));
        let handle = CallSession::spawn(info, SessionConfig::default(), deps);

        Self { log, sink, handle }
    }

    async fn send_final(&self, text: &str) {
        self.handle
            .send(SessionEvent::Transcript(TranscriptEvent::new(text, true)))
            .await
            .unwrap();
    }

    /// Speak, then wait out the system's reply and the grace period
    async fn say(&self, text: &str) {
        self.send_final(text).await;
        settle().await;
    }

    async fn fill_everything(&self) {
        settle().await;
        for line in [
            "my brakes are grinding",
            "every time I stop",
            "2015 Honda Civic",
            "my name is Maria",
            "02321",
            "617 555 0123",
            "tomorrow",
            "yes it drives fine",
        ] {
            self.say(line).await;
        }
    }
}

/// Longer than any speaking window plus grace
async fn settle() {
    tokio::time::sleep(Duration::from_secs(20)).await;
}

#[tokio::test(start_paused = true)]
async fn test_greeting_and_in_progress_outcome() {
    let h = Harness::start();
    settle().await;

    let spoken = h.log.spoken();
    assert_eq!(spoken.len(), 1);
    assert!(spoken[0].contains("What's going on with your car?"));

    let patches = h.sink.patches.lock().clone();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].status, OutcomeStatus::InProgress);
    assert_eq!(patches[0].caller, CALLER);
}

#[tokio::test(start_paused = true)]
async fn test_brakes_issue_gets_followup() {
    let h = Harness::start();
    settle().await;
    h.say("my brakes are grinding").await;

    let spoken = h.log.spoken();
    assert!(spoken.last().unwrap().contains("every time you brake"));

    h.handle.send(SessionEvent::Stop).await.unwrap();
    let report = h.handle.join().await.unwrap();
    assert_eq!(report.snapshot.issue_category, Some(IssueCategory::Brakes));
    assert_eq!(report.snapshot.issue_text.as_deref(), Some("my brakes are grinding"));
}

#[tokio::test(start_paused = true)]
async fn test_full_intake_confirmed() {
    let h = Harness::start();
    h.fill_everything().await;

    let summary = h.log.spoken().last().unwrap().clone();
    assert!(summary.contains("zero 2 3 2 1"));
    assert!(summary.contains("6 1 7, 5 5 5, zero 1 2 3"));
    assert!(summary.ends_with("Is that all correct?"));

    h.say("yes").await;

    assert_eq!(h.log.count("create_record"), 1);
    assert_eq!(h.log.count("hangup"), 1);
    assert!(h.log.spoken().last().unwrap().starts_with("You're all set."));

    // Record before the closing line, hangup after it
    let record_at = h.log.position(|e| e == "create_record").unwrap();
    let closing_at = h.log.position(|e| e.starts_with("say:You're all set.")).unwrap();
    let hangup_at = h.log.position(|e| e == "hangup").unwrap();
    assert!(record_at < closing_at && closing_at < hangup_at);

    let report = h.handle.join().await.unwrap();
    assert_eq!(report.lifecycle, CallLifecycle::Ended);
    assert_eq!(report.disposition, Some(Disposition::Confirmed));
    assert_eq!(report.record_id.as_deref(), Some("rec-1"));
    assert_eq!(report.snapshot.zip.as_deref(), Some("02321"));
    assert_eq!(report.snapshot.urgency_window, Some(UrgencyWindow::Tomorrow));
    assert_eq!(report.snapshot.drivable, Some(true));

    let terminal = h.sink.terminal_patches();
    assert_eq!(terminal.len(), 1);
    assert_eq!(terminal[0].status, OutcomeStatus::Final(Disposition::Confirmed));
    assert_eq!(terminal[0].record_id.as_deref(), Some("rec-1"));

    let records = h.sink.records.lock().clone();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].caller, CALLER);
    assert_eq!(records[0].snapshot.name.as_deref(), Some("Maria"));
}

#[tokio::test(start_paused = true)]
async fn test_repeated_yes_emits_one_record() {
    let h = Harness::start();
    h.fill_everything().await;

    h.send_final("yes").await;
    tokio::time::sleep(Duration::from_secs(2)).await;
    h.send_final("yes please").await;
    h.send_final("yep that's right").await;
    settle().await;

    assert_eq!(h.log.count("create_record"), 1);
    assert_eq!(h.sink.records.lock().len(), 1);
    assert_eq!(h.sink.terminal_patches().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_correction_then_confirm() {
    let h = Harness::start();
    h.fill_everything().await;

    h.say("no").await;
    assert!(h.log.spoken().last().unwrap().contains("What should I fix"));

    h.say("zip").await;
    assert_eq!(h.log.spoken().last().unwrap(), "What's your zip code?");

    h.say("90210").await;
    let summary = h.log.spoken().last().unwrap().clone();
    assert!(summary.contains("9 zero 2 1 zero"));
    // Untouched slots survive the correction
    assert!(summary.contains("Maria"));

    h.say("yes").await;
    let report = h.handle.join().await.unwrap();
    assert_eq!(report.disposition, Some(Disposition::Confirmed));
    assert_eq!(report.snapshot.zip.as_deref(), Some("90210"));
    assert_eq!(report.snapshot.name.as_deref(), Some("Maria"));
}

#[tokio::test(start_paused = true)]
async fn test_escalation_transfers() {
    let h = Harness::start();
    settle().await;
    h.say("my car won't start").await;
    h.say("I want to talk to a person").await;

    let spoken_before = h.log.spoken().len();
    assert!(h.log.spoken().last().unwrap().contains("connect you"));
    assert_eq!(h.log.count("transfer"), 1);

    // No further questions once transferred
    h.say("02321").await;
    assert_eq!(h.log.spoken().len(), spoken_before);

    h.handle.send(SessionEvent::Stop).await.unwrap();
    let report = h.handle.join().await.unwrap();
    assert_eq!(report.lifecycle, CallLifecycle::Transferred);
    assert_eq!(report.disposition, Some(Disposition::Transferred));

    let terminal = h.sink.terminal_patches();
    assert_eq!(terminal.len(), 1);
    assert_eq!(terminal[0].status, OutcomeStatus::Final(Disposition::Transferred));
    assert_eq!(h.log.count("create_record"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_short_name_rejected_as_issue() {
    let h = Harness::start();
    settle().await;
    h.say("Tom").await;

    assert_eq!(
        h.log.spoken().last().unwrap(),
        "Could you describe the problem you're having with the car?"
    );

    h.handle.send(SessionEvent::Stop).await.unwrap();
    let report = h.handle.join().await.unwrap();
    assert_eq!(report.snapshot.issue_text, None);
    assert_eq!(report.disposition, Some(Disposition::EndedUnconfirmed));
}

#[tokio::test(start_paused = true)]
async fn test_barge_in_clears_playback_before_turn() {
    let h = Harness::start();
    // Greeting still playing
    tokio::time::sleep(Duration::from_millis(500)).await;
    h.say("my brakes are grinding").await;

    let clear_at = h.log.position(|e| e == "clear").unwrap();
    let followup_at = h.log.position(|e| e.contains("every time you brake")).unwrap();
    let greeting_at = h.log.position(|e| e.starts_with("say:Thanks for calling")).unwrap();
    assert!(greeting_at < clear_at && clear_at < followup_at);
    assert_eq!(h.log.count("clear"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_no_barge_in_after_speech_window() {
    let h = Harness::start();
    settle().await;
    h.say("my brakes are grinding").await;
    assert_eq!(h.log.count("clear"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_last_utterance_wins_and_duplicates_dropped() {
    let h = Harness::start();
    settle().await;

    h.send_final("my brakes are grinding").await;
    h.send_final("my brakes are grinding").await;
    h.send_final("actually my car won't start").await;
    settle().await;

    h.handle.send(SessionEvent::Stop).await.unwrap();
    let report = h.handle.join().await.unwrap();
    assert_eq!(report.turns, 1);
    assert_eq!(report.snapshot.issue_category, Some(IssueCategory::NoStart));
}

#[tokio::test(start_paused = true)]
async fn test_partials_do_not_drive_turns() {
    let h = Harness::start();
    settle().await;

    h.handle
        .send(SessionEvent::Transcript(TranscriptEvent::new("my bra", false)))
        .await
        .unwrap();
    settle().await;
    assert_eq!(h.log.spoken().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_socket_close_writes_single_terminal_outcome() {
    let h = Harness::start();
    settle().await;
    h.say("my brakes are grinding").await;

    h.handle.send(SessionEvent::SocketClosed).await.unwrap();
    let report = h.handle.join().await.unwrap();
    assert_eq!(report.disposition, Some(Disposition::SocketClosed));

    let terminal = h.sink.terminal_patches();
    assert_eq!(terminal.len(), 1);
    assert_eq!(terminal[0].status, OutcomeStatus::Final(Disposition::SocketClosed));
    assert_eq!(
        terminal[0].snapshot.as_ref().and_then(|s| s.issue_category),
        Some(IssueCategory::Brakes)
    );
}

#[tokio::test(start_paused = true)]
async fn test_stop_before_hangup_keeps_confirmed_outcome() {
    let h = Harness::start();
    h.fill_everything().await;

    h.send_final("yes").await;
    // Past dispatch, before the closing line and delay have elapsed
    tokio::time::sleep(Duration::from_secs(2)).await;
    h.handle.send(SessionEvent::Stop).await.unwrap();

    let report = h.handle.join().await.unwrap();
    assert_eq!(report.disposition, Some(Disposition::Confirmed));
    assert_eq!(h.log.count("hangup"), 0);
    assert_eq!(h.sink.terminal_patches().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_sink_failures_do_not_end_call() {
    let sink = FakeSink::default();
    sink.fail.store(true, Ordering::SeqCst);
    let h = Harness::start_with(sink);
    h.fill_everything().await;
    h.say("yes").await;

    assert_eq!(h.log.count("create_record"), 1);
    assert_eq!(h.log.count("hangup"), 1);

    let report = h.handle.join().await.unwrap();
    assert_eq!(report.disposition, Some(Disposition::Confirmed));
    assert_eq!(report.record_id, None);
}
