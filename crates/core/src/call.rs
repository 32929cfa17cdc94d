//! Call identity and lifecycle

use serde::{Deserialize, Serialize};

/// Caller identifier used when the carrier does not supply one
pub const UNKNOWN_CALLER: &str = "unknown";

/// Identity of one carrier call, fixed at stream start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallInfo {
    /// Carrier call identifier (outcome key)
    pub call_id: String,
    /// Media stream identifier, echoed on outbound frames
    pub stream_id: String,
    /// Caller phone number or `UNKNOWN_CALLER`
    pub caller: String,
}

impl CallInfo {
    pub fn new(
        call_id: impl Into<String>,
        stream_id: impl Into<String>,
        caller: Option<String>,
    ) -> Self {
        let caller = caller
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNKNOWN_CALLER.to_string());
        Self {
            call_id: call_id.into(),
            stream_id: stream_id.into(),
            caller,
        }
    }

    pub fn caller_known(&self) -> bool {
        self.caller != UNKNOWN_CALLER
    }
}

/// Lifecycle flag of a call session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CallLifecycle {
    #[default]
    Active,
    Transferred,
    Confirmed,
    Ended,
}

impl CallLifecycle {
    pub fn is_active(&self) -> bool {
        matches!(self, CallLifecycle::Active)
    }
}

/// Terminal disposition written to the outcome sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Confirmed,
    Transferred,
    EndedUnconfirmed,
    SocketClosed,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Confirmed => "confirmed",
            Disposition::Transferred => "transferred",
            Disposition::EndedUnconfirmed => "ended_unconfirmed",
            Disposition::SocketClosed => "socket_closed",
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
