//! ScyllaDB schema creation

use crate::error::PersistenceError;
use scylla::Session;

/// Create the keyspace if it doesn't exist
pub async fn create_keyspace(
    session: &Session,
    keyspace: &str,
    replication_factor: u8,
) -> Result<(), PersistenceError> {
    let query = format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
        keyspace, replication_factor
    );

    session
        .query_unpaged(query, &[])
        .await
        .map_err(|e| PersistenceError::SchemaError(format!("Failed to create keyspace: {}", e)))?;

    Ok(())
}

/// Create all required tables
pub async fn create_tables(session: &Session, keyspace: &str) -> Result<(), PersistenceError> {
    // One row per call, rewritten in place (in progress, then terminal)
    let outcomes_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.call_outcomes (
            call_id TEXT,
            status TEXT,
            caller TEXT,
            snapshot_json TEXT,
            record_id TEXT,
            updated_at BIGINT,
            PRIMARY KEY (call_id)
        ) WITH default_time_to_live = 7776000
    "#,
        keyspace
    );

    session
        .query_unpaged(outcomes_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::SchemaError(format!("Failed to create call_outcomes table: {}", e))
        })?;

    // Keyed by call id so a repeated insert overwrites rather than duplicates
    let records_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.intake_records (
            call_id TEXT,
            record_id TEXT,
            caller TEXT,
            disposition TEXT,
            issue_text TEXT,
            issue_category TEXT,
            car_make_model TEXT,
            car_year TEXT,
            customer_name TEXT,
            zip TEXT,
            phone TEXT,
            urgency_window TEXT,
            drivable BOOLEAN,
            created_at BIGINT,
            PRIMARY KEY (call_id)
        )
    "#,
        keyspace
    );

    session
        .query_unpaged(records_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::SchemaError(format!("Failed to create intake_records table: {}", e))
        })?;

    tracing::info!("All tables created successfully");
    Ok(())
}
