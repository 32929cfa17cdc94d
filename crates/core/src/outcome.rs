//! Outcome records and patches handed to the outcome sink

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::call::Disposition;
use crate::slots::{IssueCategory, UrgencyWindow};

/// Immutable copy of the collected slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DialogueSnapshot {
    pub issue_text: Option<String>,
    pub issue_category: Option<IssueCategory>,
    pub car_make_model: Option<String>,
    pub car_year: Option<String>,
    pub name: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub urgency_window: Option<UrgencyWindow>,
    pub drivable: Option<bool>,
}

/// Progress marker stored under the call id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "disposition")]
pub enum OutcomeStatus {
    InProgress,
    Final(Disposition),
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::InProgress => "in_progress",
            OutcomeStatus::Final(d) => d.as_str(),
        }
    }
}

/// Insert-or-update payload keyed by call id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomePatch {
    pub status: OutcomeStatus,
    pub caller: String,
    pub snapshot: Option<DialogueSnapshot>,
    pub record_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl OutcomePatch {
    pub fn in_progress(caller: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::InProgress,
            caller: caller.into(),
            snapshot: None,
            record_id: None,
            updated_at: Utc::now(),
        }
    }

    pub fn terminal(
        disposition: Disposition,
        caller: impl Into<String>,
        snapshot: DialogueSnapshot,
    ) -> Self {
        Self {
            status: OutcomeStatus::Final(disposition),
            caller: caller.into(),
            snapshot: Some(snapshot),
            record_id: None,
            updated_at: Utc::now(),
        }
    }

    pub fn with_record_id(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }
}

/// Finalized record emitted at most once per call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub call_id: String,
    pub caller: String,
    pub disposition: Disposition,
    pub snapshot: DialogueSnapshot,
    pub created_at: DateTime<Utc>,
}

impl OutcomeRecord {
    pub fn new(
        call_id: impl Into<String>,
        caller: impl Into<String>,
        disposition: Disposition,
        snapshot: DialogueSnapshot,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            caller: caller.into(),
            disposition,
            snapshot,
            created_at: Utc::now(),
        }
    }
}
