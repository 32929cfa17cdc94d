//! In-process outcome sink
//!
//! Used when ScyllaDB persistence is disabled, and by tests. Records are
//! keyed by call id, so a repeated `create_record` returns the first id.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use voice_intake_core::{OutcomePatch, OutcomeRecord, OutcomeSink, Result as CoreResult};

use crate::outcomes::StoredOutcome;

#[derive(Debug, Default)]
pub struct InMemoryOutcomeSink {
    outcomes: RwLock<HashMap<String, StoredOutcome>>,
    records: RwLock<HashMap<String, (String, OutcomeRecord)>>,
}

impl InMemoryOutcomeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcome(&self, call_id: &str) -> Option<StoredOutcome> {
        self.outcomes.read().get(call_id).cloned()
    }

    /// Record id and record for a call
    pub fn record(&self, call_id: &str) -> Option<(String, OutcomeRecord)> {
        self.records.read().get(call_id).cloned()
    }

    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }
}

#[async_trait]
impl OutcomeSink for InMemoryOutcomeSink {
    async fn upsert_outcome(&self, call_id: &str, patch: &OutcomePatch) -> CoreResult<()> {
        let mut outcomes = self.outcomes.write();
        outcomes
            .entry(call_id.to_string())
            .and_modify(|existing| existing.apply(patch))
            .or_insert_with(|| StoredOutcome::new(call_id, patch));

        tracing::debug!(call_id = %call_id, status = patch.status.as_str(), "Outcome upserted");
        Ok(())
    }

    async fn create_record(&self, record: &OutcomeRecord) -> CoreResult<String> {
        let mut records = self.records.write();
        if let Some((record_id, _)) = records.get(&record.call_id) {
            tracing::warn!(call_id = %record.call_id, "Record already exists, returning original id");
            return Ok(record_id.clone());
        }

        let record_id = Uuid::new_v4().to_string();
        records.insert(record.call_id.clone(), (record_id.clone(), record.clone()));
        tracing::info!(call_id = %record.call_id, record_id = %record_id, "Record created");
        Ok(record_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voice_intake_core::{DialogueSnapshot, Disposition};

    #[tokio::test]
    async fn test_upsert_is_idempotent_by_call_id() {
        let sink = InMemoryOutcomeSink::new();
        sink.upsert_outcome("CA1", &OutcomePatch::in_progress("unknown"))
            .await
            .unwrap();
        sink.upsert_outcome(
            "CA1",
            &OutcomePatch::terminal(
                Disposition::SocketClosed,
                "unknown",
                DialogueSnapshot::default(),
            ),
        )
        .await
        .unwrap();

        let outcome = sink.outcome("CA1").unwrap();
        assert_eq!(outcome.status, "socket_closed");
        assert!(outcome.snapshot.is_some());
        assert!(sink.outcome("CA2").is_none());
    }

    #[tokio::test]
    async fn test_create_record_once_per_call() {
        let sink = InMemoryOutcomeSink::new();
        let record = OutcomeRecord::new(
            "CA1",
            "+16175550123",
            Disposition::Confirmed,
            DialogueSnapshot::default(),
        );

        let first = sink.create_record(&record).await.unwrap();
        let second = sink.create_record(&record).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(sink.record_count(), 1);
        assert_eq!(sink.record("CA1").map(|(id, _)| id), Some(first));
    }
}
