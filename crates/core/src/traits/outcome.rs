//! Outcome sink trait

use async_trait::async_trait;

use crate::{OutcomePatch, OutcomeRecord, Result};

/// Persistence/dispatch collaborator for session results
///
/// The engine never retries delivery; durability is the sink's concern.
#[async_trait]
pub trait OutcomeSink: Send + Sync + 'static {
    /// Insert or update the outcome row for `call_id`. Must be idempotent.
    async fn upsert_outcome(&self, call_id: &str, patch: &OutcomePatch) -> Result<()>;

    /// Create the downstream record. Called at most once per call.
    async fn create_record(&self, record: &OutcomeRecord) -> Result<String>;
}
