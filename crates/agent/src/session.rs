//! Per-call session actor
//!
//! One tokio task per call owns the [`DialogueState`], the debouncer and the
//! speech player. Everything that touches the call arrives through a single
//! mpsc inbox, so turns are strictly serialized and the state needs no locks.
//!
//! ```text
//!  transcripts ─┐
//!  stop/close ──┼─▶ inbox ─▶ select! ─▶ Debouncer ─▶ DialoguePolicy ─▶ SpeechPlayer ─▶ egress
//!               │              ▲                         │
//!  timers ──────┘──────────────┘                         └─▶ CallControl / OutcomeSink
//! ```

use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::Instrument;

use voice_intake_config::{DialogueConfig, PromptsConfig, Settings, SpeechConfig};
use voice_intake_core::{
    AudioEgress, CallControl, CallInfo, CallLifecycle, DialogueSnapshot, Disposition,
    OutcomePatch, OutcomeRecord, OutcomeSink, Result as CoreResult, SpeechSynthesizer,
    TranscriptEvent, Utterance,
};

use crate::debounce::{Admission, DebounceConfig, Debouncer};
use crate::dst::DialogueState;
use crate::metrics;
use crate::policy::{DialoguePolicy, PolicyAction};
use crate::speech_player::{SpeechPlayer, SpeechPlayerConfig};
use crate::AgentError;

/// Inbox capacity per call
const INBOX_CAPACITY: usize = 64;

/// Events delivered to a session actor
#[derive(Debug)]
pub enum SessionEvent {
    /// Partial or final recognition result
    Transcript(TranscriptEvent),
    /// Carrier signalled end of call
    Stop,
    /// Media connection dropped without a stop
    SocketClosed,
}

/// External collaborators a session talks to
#[derive(Clone)]
pub struct SessionDeps {
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub egress: Arc<dyn AudioEgress>,
    pub call_control: Arc<dyn CallControl>,
    pub sink: Arc<dyn OutcomeSink>,
}

/// Per-session settings, shared by every call
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub dialogue: DialogueConfig,
    pub speech: SpeechConfig,
    pub prompts: Arc<PromptsConfig>,
    /// Substituted into the apology line
    pub alternate_contact: String,
}

impl SessionConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            dialogue: settings.dialogue.clone(),
            speech: settings.speech.clone(),
            prompts: Arc::new(settings.prompts.clone()),
            alternate_contact: settings.telephony.alternate_contact.clone(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// What a finished session reports back
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub call_id: String,
    pub lifecycle: CallLifecycle,
    pub disposition: Option<Disposition>,
    pub record_id: Option<String>,
    pub snapshot: DialogueSnapshot,
    pub turns: u32,
}

/// Owner-side handle to a running session
#[derive(Debug)]
pub struct SessionHandle {
    call_id: String,
    tx: mpsc::Sender<SessionEvent>,
    task: JoinHandle<SessionReport>,
}

impl SessionHandle {
    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn sender(&self) -> mpsc::Sender<SessionEvent> {
        self.tx.clone()
    }

    pub async fn send(&self, event: SessionEvent) -> Result<(), AgentError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| AgentError::ChannelClosed)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the actor to finish
    pub async fn join(self) -> Result<SessionReport, AgentError> {
        drop(self.tx);
        self.task
            .await
            .map_err(|e| AgentError::Session(format!("session task failed: {}", e)))
    }
}

/// Forward a transcription event stream into a session inbox.
///
/// Provider errors are logged; the end of the stream is not an end of call
/// (the carrier's stop event is).
pub fn forward_transcripts(
    call_id: String,
    mut events: Pin<Box<dyn Stream<Item = CoreResult<TranscriptEvent>> + Send>>,
    tx: mpsc::Sender<SessionEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match event {
                Ok(event) => {
                    if tx.send(SessionEvent::Transcript(event)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(call_id = %call_id, error = %e, "Transcription stream error");
                }
            }
        }
        tracing::debug!(call_id = %call_id, "Transcription stream ended");
    })
}

/// The actor itself
pub struct CallSession {
    info: CallInfo,
    config: SessionConfig,
    deps: SessionDeps,
    state: DialogueState,
    policy: DialoguePolicy,
    debouncer: Debouncer,
    player: SpeechPlayer,
    lifecycle: CallLifecycle,
    disposition: Option<Disposition>,
    record_id: Option<String>,
    hangup_at: Option<Instant>,
    turns: u32,
}

impl CallSession {
    pub fn new(info: CallInfo, config: SessionConfig, deps: SessionDeps) -> Self {
        let policy = DialoguePolicy::new(&config.dialogue, config.prompts.clone());
        let debouncer = Debouncer::new(DebounceConfig::from(&config.dialogue));
        let player = SpeechPlayer::new(
            info.call_id.clone(),
            deps.synthesizer.clone(),
            deps.egress.clone(),
            SpeechPlayerConfig {
                dialogue: config.dialogue.clone(),
                speech: config.speech.clone(),
                apology: config.prompts.apology(&config.alternate_contact),
            },
        );

        Self {
            info,
            config,
            deps,
            state: DialogueState::new(),
            policy,
            debouncer,
            player,
            lifecycle: CallLifecycle::Active,
            disposition: None,
            record_id: None,
            hangup_at: None,
            turns: 0,
        }
    }

    /// Start the actor on its own task
    pub fn spawn(info: CallInfo, config: SessionConfig, deps: SessionDeps) -> SessionHandle {
        let (tx, rx) = mpsc::channel(INBOX_CAPACITY);
        let call_id = info.call_id.clone();
        let span = tracing::info_span!("call_session", call_id = %call_id);
        let session = Self::new(info, config, deps);
        let task = tokio::spawn(session.run(rx).instrument(span));

        SessionHandle { call_id, tx, task }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<SessionEvent>) -> SessionReport {
        self.start().await;

        loop {
            let deadline = self.next_deadline();

            tokio::select! {
                biased;

                event = rx.recv() => match event {
                    Some(SessionEvent::Transcript(event)) => self.on_transcript(event).await,
                    Some(SessionEvent::Stop) => {
                        self.finish(Disposition::EndedUnconfirmed).await;
                        break;
                    }
                    Some(SessionEvent::SocketClosed) | None => {
                        self.finish(Disposition::SocketClosed).await;
                        break;
                    }
                },

                _ = wait_until(deadline) => {
                    if self.on_timer().await {
                        break;
                    }
                }
            }
        }

        tracing::info!(
            lifecycle = ?self.lifecycle,
            disposition = ?self.disposition,
            turns = self.turns,
            "Session ended"
        );

        SessionReport {
            call_id: self.info.call_id.clone(),
            lifecycle: self.lifecycle,
            disposition: self.disposition,
            record_id: self.record_id.clone(),
            snapshot: self.state.snapshot(),
            turns: self.turns,
        }
    }

    async fn start(&mut self) {
        tracing::info!(caller = %self.info.caller, "Session started");

        let patch = OutcomePatch::in_progress(self.info.caller.clone());
        if let Err(e) = self.deps.sink.upsert_outcome(&self.info.call_id, &patch).await {
            metrics::record_sink_failure("upsert");
            tracing::warn!(error = %e, "In-progress outcome write failed");
        }

        let greeting = self.policy.opening(&mut self.state);
        self.perform(greeting).await;
    }

    fn next_deadline(&self) -> Option<Instant> {
        let dispatch = self.debouncer.ready_at(self.player.speaking_until());
        match (dispatch, self.hangup_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    async fn on_transcript(&mut self, event: TranscriptEvent) {
        if !self.lifecycle.is_active() {
            return;
        }

        match self.debouncer.on_transcript(&event) {
            Admission::Ignored => return,
            Admission::Duplicate => {
                metrics::record_duplicate_transcript();
                tracing::debug!(text = %event.text, "Duplicate final transcript dropped");
                return;
            }
            Admission::Pending { superseded } => {
                if superseded {
                    tracing::debug!(text = %event.text, "Pending utterance superseded");
                }
            }
        }

        // Barge-in: playback is cleared before the new turn is even eligible
        if let Err(e) = self.player.barge_in(Instant::now()).await {
            tracing::warn!(error = %e, "Clear playback failed");
        }
    }

    /// Returns true when the session is done
    async fn on_timer(&mut self) -> bool {
        let now = Instant::now();

        if let Some(at) = self.hangup_at {
            if now >= at {
                self.hangup_at = None;
                return self.hang_up().await;
            }
        }

        if let Some(utterance) =
            self.debouncer
                .take_ready(false, self.player.speaking_until(), now)
        {
            self.process_turn(utterance).await;
        }

        false
    }

    async fn process_turn(&mut self, utterance: Utterance) {
        self.turns += 1;
        let caller = self
            .info
            .caller_known()
            .then_some(self.info.caller.as_str());

        let action = self
            .policy
            .on_utterance(&mut self.state, &utterance.text, caller);

        metrics::record_turn(action.name());
        tracing::info!(
            turn = self.turns,
            utterance = %utterance.text,
            action = action.name(),
            step = %self.state.current_step(),
            "Turn processed"
        );

        self.perform(action).await;
    }

    async fn perform(&mut self, action: PolicyAction) {
        match action {
            PolicyAction::Ignore => {}
            PolicyAction::Transfer { ack } => {
                self.lifecycle = CallLifecycle::Transferred;
                self.debouncer.clear();
                self.player.speak(&ack).await;
                if let Err(e) = self.deps.call_control.transfer_to_human(&self.info.call_id).await {
                    tracing::error!(error = %e, "Transfer to human failed");
                }
                self.write_terminal(Disposition::Transferred).await;
            }
            PolicyAction::Finalize { closing } => {
                self.lifecycle = CallLifecycle::Confirmed;
                self.debouncer.clear();
                self.emit_record().await;
                self.player.speak(&closing).await;
                let spoken_until = self.player.speaking_until().unwrap_or_else(Instant::now);
                self.hangup_at = Some(spoken_until + self.config.dialogue.closing_delay());
            }
            other => {
                if let Some(line) = other.speech() {
                    self.player.speak(line).await;
                }
            }
        }
    }

    /// Create the downstream record exactly once, then the terminal outcome
    async fn emit_record(&mut self) {
        if !self.state.claim_record_emission() {
            tracing::warn!("Record already emitted, skipping");
            return;
        }

        let record = OutcomeRecord::new(
            self.info.call_id.clone(),
            self.info.caller.clone(),
            Disposition::Confirmed,
            self.state.snapshot(),
        );

        match self.deps.sink.create_record(&record).await {
            Ok(record_id) => {
                tracing::info!(record_id = %record_id, "Record created");
                self.record_id = Some(record_id);
            }
            Err(e) => {
                metrics::record_sink_failure("create_record");
                tracing::error!(error = %e, "Record creation failed");
            }
        }

        self.write_terminal(Disposition::Confirmed).await;
    }

    async fn write_terminal(&mut self, disposition: Disposition) {
        if self.disposition.is_some() {
            return;
        }
        self.disposition = Some(disposition);
        metrics::record_disposition(disposition.as_str());

        let mut patch =
            OutcomePatch::terminal(disposition, self.info.caller.clone(), self.state.snapshot());
        if let Some(record_id) = &self.record_id {
            patch = patch.with_record_id(record_id.clone());
        }

        if let Err(e) = self.deps.sink.upsert_outcome(&self.info.call_id, &patch).await {
            metrics::record_sink_failure("upsert");
            tracing::warn!(error = %e, disposition = %disposition, "Terminal outcome write failed");
        }
    }

    async fn hang_up(&mut self) -> bool {
        if self.lifecycle != CallLifecycle::Confirmed {
            return false;
        }

        if let Err(e) = self.deps.call_control.hangup(&self.info.call_id).await {
            tracing::warn!(error = %e, "Hangup failed");
        }
        self.lifecycle = CallLifecycle::Ended;
        true
    }

    async fn finish(&mut self, disposition: Disposition) {
        self.hangup_at = None;
        self.debouncer.clear();
        if self.lifecycle.is_active() {
            self.lifecycle = CallLifecycle::Ended;
        }
        self.write_terminal(disposition).await;
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
