//! Outcome persistence for the intake agent
//!
//! Provides the [`OutcomeSink`] implementations:
//! - ScyllaDB (`call_outcomes` + `intake_records` tables)
//! - In-memory (persistence disabled, tests)

pub mod client;
pub mod error;
pub mod memory;
pub mod outcomes;
pub mod schema;

pub use client::{ScyllaClient, ScyllaConfig};
pub use error::PersistenceError;
pub use memory::InMemoryOutcomeSink;
pub use outcomes::{ScyllaOutcomeSink, StoredOutcome};

use std::sync::Arc;
use voice_intake_config::PersistenceConfig;
use voice_intake_core::OutcomeSink;

/// Build the configured outcome sink
///
/// Connects and ensures the schema when persistence is enabled; otherwise
/// falls back to the in-memory sink.
pub async fn init(config: &PersistenceConfig) -> Result<Arc<dyn OutcomeSink>, PersistenceError> {
    if !config.enabled {
        tracing::info!("Persistence disabled, using in-memory outcome sink");
        return Ok(Arc::new(InMemoryOutcomeSink::new()));
    }

    let client = ScyllaClient::connect(ScyllaConfig::from(config)).await?;
    client.ensure_schema().await?;
    Ok(Arc::new(ScyllaOutcomeSink::new(client)))
}
