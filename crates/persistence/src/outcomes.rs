//! Outcome sink backed by ScyllaDB

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use voice_intake_core::{
    DialogueSnapshot, OutcomePatch, OutcomeRecord, OutcomeSink, OutcomeStatus,
    Result as CoreResult,
};

use crate::{PersistenceError, ScyllaClient};

/// Current outcome row for a call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredOutcome {
    pub call_id: String,
    pub status: String,
    pub caller: String,
    pub snapshot: Option<DialogueSnapshot>,
    pub record_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl StoredOutcome {
    pub fn new(call_id: impl Into<String>, patch: &OutcomePatch) -> Self {
        let mut outcome = Self {
            call_id: call_id.into(),
            status: String::new(),
            caller: String::new(),
            snapshot: None,
            record_id: None,
            updated_at: patch.updated_at,
        };
        outcome.apply(patch);
        outcome
    }

    /// Merge a patch. Absent snapshot and record id leave the stored ones.
    pub fn apply(&mut self, patch: &OutcomePatch) {
        self.status = patch.status.as_str().to_string();
        self.caller = patch.caller.clone();
        self.updated_at = patch.updated_at;
        if let Some(snapshot) = &patch.snapshot {
            self.snapshot = Some(snapshot.clone());
        }
        if let Some(record_id) = &patch.record_id {
            self.record_id = Some(record_id.clone());
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != OutcomeStatus::InProgress.as_str()
    }
}

/// ScyllaDB implementation of the outcome sink
#[derive(Clone)]
pub struct ScyllaOutcomeSink {
    client: ScyllaClient,
}

impl ScyllaOutcomeSink {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    async fn upsert(&self, call_id: &str, patch: &OutcomePatch) -> Result<(), PersistenceError> {
        let keyspace = self.client.keyspace();
        let updated_at = patch.updated_at.timestamp_millis();

        match &patch.snapshot {
            Some(snapshot) => {
                let query = format!(
                    "UPDATE {}.call_outcomes SET status = ?, caller = ?, snapshot_json = ?,
                        record_id = ?, updated_at = ?
                     WHERE call_id = ?",
                    keyspace
                );
                let snapshot_json = serde_json::to_string(snapshot)?;
                self.client
                    .session()
                    .query_unpaged(
                        query,
                        (
                            patch.status.as_str(),
                            &patch.caller,
                            snapshot_json,
                            &patch.record_id,
                            updated_at,
                            call_id,
                        ),
                    )
                    .await?;
            }
            None => {
                let query = format!(
                    "UPDATE {}.call_outcomes SET status = ?, caller = ?, updated_at = ?
                     WHERE call_id = ?",
                    keyspace
                );
                self.client
                    .session()
                    .query_unpaged(
                        query,
                        (patch.status.as_str(), &patch.caller, updated_at, call_id),
                    )
                    .await?;
            }
        }

        tracing::info!(
            call_id = %call_id,
            status = patch.status.as_str(),
            "Outcome upserted in ScyllaDB"
        );
        Ok(())
    }

    async fn insert_record(&self, record: &OutcomeRecord) -> Result<String, PersistenceError> {
        let record_id = Uuid::new_v4().to_string();
        let query = format!(
            "INSERT INTO {}.intake_records (
                call_id, record_id, caller, disposition,
                issue_text, issue_category, car_make_model, car_year,
                customer_name, zip, phone, urgency_window, drivable, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        let s = &record.snapshot;
        self.client
            .session()
            .query_unpaged(
                query,
                (
                    &record.call_id,
                    &record_id,
                    &record.caller,
                    record.disposition.as_str(),
                    &s.issue_text,
                    s.issue_category.map(|c| c.as_str()),
                    &s.car_make_model,
                    &s.car_year,
                    &s.name,
                    &s.zip,
                    &s.phone,
                    s.urgency_window.map(|u| u.as_str()),
                    s.drivable,
                    record.created_at.timestamp_millis(),
                ),
            )
            .await?;

        tracing::info!(
            call_id = %record.call_id,
            record_id = %record_id,
            category = ?s.issue_category,
            "Intake record created in ScyllaDB"
        );
        Ok(record_id)
    }

    /// Read back the outcome row for a call
    pub async fn outcome(&self, call_id: &str) -> Result<Option<StoredOutcome>, PersistenceError> {
        let query = format!(
            "SELECT status, caller, snapshot_json, record_id, updated_at
             FROM {}.call_outcomes WHERE call_id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (call_id,))
            .await?;

        let Some(row) = result.rows.and_then(|rows| rows.into_iter().next()) else {
            return Ok(None);
        };

        let (status, caller, snapshot_json, record_id, updated_at): (
            String,
            String,
            Option<String>,
            Option<String>,
            i64,
        ) = row
            .into_typed()
            .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

        let snapshot = snapshot_json
            .map(|json| serde_json::from_str(&json))
            .transpose()?;
        let updated_at = Utc
            .timestamp_millis_opt(updated_at)
            .single()
            .ok_or_else(|| PersistenceError::InvalidData(format!("bad timestamp {}", updated_at)))?;

        Ok(Some(StoredOutcome {
            call_id: call_id.to_string(),
            status,
            caller,
            snapshot,
            record_id,
            updated_at,
        }))
    }
}

#[async_trait]
impl OutcomeSink for ScyllaOutcomeSink {
    async fn upsert_outcome(&self, call_id: &str, patch: &OutcomePatch) -> CoreResult<()> {
        Ok(self.upsert(call_id, patch).await?)
    }

    async fn create_record(&self, record: &OutcomeRecord) -> CoreResult<String> {
        Ok(self.insert_record(record).await?)
    }
}
