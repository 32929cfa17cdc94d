//! Carrier media-stream websocket
//!
//! Inbound JSON events: `connected`, `start`, `media` (base64 audio),
//! `mark`, `stop`. Outbound: `media` frames and `clear` (barge-in).
//! One socket carries exactly one call.

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use voice_intake_agent::{
    forward_transcripts, CallSession, SessionDeps, SessionEvent, SessionHandle,
};
use voice_intake_core::{AudioEgress, CallInfo, Error, Result as CoreResult};

use crate::metrics;
use crate::state::AppState;
use crate::ServerError;

type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// Inbound carrier event
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum CarrierEvent {
    Connected {
        #[serde(default)]
        protocol: Option<String>,
    },
    Start {
        start: StartMeta,
    },
    Media {
        media: MediaPayload,
    },
    Mark {
        #[serde(default)]
        mark: Option<MarkPayload>,
    },
    Stop,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartMeta {
    pub stream_sid: String,
    pub call_sid: String,
    #[serde(default)]
    pub custom_parameters: HashMap<String, String>,
}

impl StartMeta {
    /// Caller number passed through the stream's custom parameters
    pub fn caller(&self) -> Option<String> {
        self.custom_parameters
            .get("from")
            .or_else(|| self.custom_parameters.get("caller"))
            .cloned()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaPayload {
    pub payload: String,
    #[serde(default)]
    pub track: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkPayload {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum Outbound<'a> {
    Media {
        #[serde(rename = "streamSid")]
        stream_sid: &'a str,
        media: OutboundMedia,
    },
    Clear {
        #[serde(rename = "streamSid")]
        stream_sid: &'a str,
    },
}

#[derive(Debug, Serialize)]
struct OutboundMedia {
    payload: String,
}

pub fn parse_event(text: &str) -> Result<CarrierEvent, ServerError> {
    serde_json::from_str(text).map_err(|e| ServerError::Protocol(e.to_string()))
}

fn media_message(stream_sid: &str, frame: &[u8]) -> String {
    let outbound = Outbound::Media {
        stream_sid,
        media: OutboundMedia {
            payload: BASE64.encode(frame),
        },
    };
    serde_json::to_string(&outbound).unwrap_or_default()
}

fn clear_message(stream_sid: &str) -> String {
    serde_json::to_string(&Outbound::Clear { stream_sid }).unwrap_or_default()
}

/// Outbound audio over the carrier socket
pub struct WsEgress {
    stream_sid: String,
    sender: WsSender,
}

impl WsEgress {
    fn new(stream_sid: impl Into<String>, sender: WsSender) -> Self {
        Self {
            stream_sid: stream_sid.into(),
            sender,
        }
    }

    async fn send_text(&self, text: String) -> CoreResult<()> {
        self.sender
            .lock()
            .await
            .send(Message::Text(text))
            .await
            .map_err(|e| Error::Telephony(format!("websocket send failed: {}", e)))
    }
}

#[async_trait]
impl AudioEgress for WsEgress {
    async fn send_audio(&self, _call_id: &str, frame: &[u8]) -> CoreResult<()> {
        self.send_text(media_message(&self.stream_sid, frame)).await
    }

    async fn clear_playback(&self, call_id: &str) -> CoreResult<()> {
        tracing::debug!(call_id = %call_id, "Clearing carrier playback");
        self.send_text(clear_message(&self.stream_sid)).await
    }
}

/// A call that has passed `start`
struct ActiveCall {
    call_id: String,
    session: SessionHandle,
    audio: Option<mpsc::Sender<Vec<u8>>>,
}

impl ActiveCall {
    async fn start(
        state: &AppState,
        meta: StartMeta,
        sender: WsSender,
    ) -> Result<Self, ServerError> {
        let caller = meta.caller();
        let info = CallInfo::new(meta.call_sid, meta.stream_sid.clone(), caller);
        // The slot is held before the session exists, so a refused call
        // never writes an outcome
        state.calls.reserve(&info.call_id, &info.caller)?;

        tracing::info!(
            call_id = %info.call_id,
            stream_sid = %info.stream_id,
            caller = %info.caller,
            "Call started"
        );

        let deps = SessionDeps {
            synthesizer: state.synthesizer.clone(),
            egress: Arc::new(WsEgress::new(meta.stream_sid, sender)),
            call_control: state.call_control.clone(),
            sink: state.sink.clone(),
        };

        let call_id = info.call_id.clone();
        let session = CallSession::spawn(info, state.session_config.clone(), deps);
        state.calls.attach(&call_id, session.sender());

        let audio = match state.transcriber.open(&call_id).await {
            Ok(stream) => {
                forward_transcripts(call_id.clone(), stream.events, session.sender());
                Some(stream.audio)
            }
            Err(e) => {
                tracing::error!(call_id = %call_id, error = %e, "Transcription unavailable for call");
                None
            }
        };

        Ok(Self {
            call_id,
            session,
            audio,
        })
    }

    async fn push_audio(&self, payload: &str) {
        let Some(audio) = &self.audio else {
            return;
        };
        match BASE64.decode(payload) {
            Ok(frame) => {
                if audio.send(frame).await.is_err() {
                    tracing::trace!(call_id = %self.call_id, "Transcription stream closed");
                }
            }
            Err(e) => {
                metrics::record_protocol_error();
                tracing::warn!(call_id = %self.call_id, error = %e, "Undecodable media payload");
            }
        }
    }

    async fn finish(self, state: &AppState, event: SessionEvent) {
        // The session may already be gone after its own hangup
        let _ = self.session.send(event).await;
        drop(self.audio);

        match self.session.join().await {
            Ok(report) => tracing::info!(
                call_id = %report.call_id,
                disposition = ?report.disposition,
                record_id = ?report.record_id,
                turns = report.turns,
                "Call finished"
            ),
            Err(e) => tracing::warn!(call_id = %self.call_id, error = %e, "Session did not finish cleanly"),
        }
        state.calls.remove(&self.call_id);
    }
}

/// Websocket upgrade for the carrier media stream
pub async fn media_stream_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (sender, mut receiver) = socket.split();
    let sender: WsSender = Arc::new(Mutex::new(sender));
    let mut call: Option<ActiveCall> = None;
    let mut ended_by_stop = false;

    while let Some(message) = receiver.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "Media stream socket error");
                break;
            }
        };

        let event = match parse_event(&text) {
            Ok(event) => event,
            Err(e) => {
                metrics::record_protocol_error();
                tracing::warn!(error = %e, "Unrecognized carrier event");
                continue;
            }
        };

        match event {
            CarrierEvent::Connected { protocol } => {
                tracing::debug!(protocol = ?protocol, "Carrier connected");
            }
            CarrierEvent::Start { start } => {
                if call.is_some() {
                    tracing::warn!("Duplicate start event ignored");
                    continue;
                }
                match ActiveCall::start(&state, start, sender.clone()).await {
                    Ok(active) => call = Some(active),
                    Err(e) => {
                        tracing::error!(error = %e, "Call rejected");
                        break;
                    }
                }
            }
            CarrierEvent::Media { media } => {
                if media.track.as_deref().is_some_and(|t| t != "inbound") {
                    continue;
                }
                if let Some(active) = &call {
                    active.push_audio(&media.payload).await;
                }
            }
            CarrierEvent::Mark { mark } => {
                tracing::trace!(mark = ?mark.map(|m| m.name), "Playback mark");
            }
            CarrierEvent::Stop => {
                ended_by_stop = true;
                break;
            }
        }
    }

    if let Some(active) = call.take() {
        let event = if ended_by_stop {
            SessionEvent::Stop
        } else {
            SessionEvent::SocketClosed
        };
        active.finish(&state, event).await;
    }
}
