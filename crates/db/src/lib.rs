//! Persistence layer for the audit trail and configuration tables:
//! `travelclick_log`, `travelclick_message_history`,
//! `travelclick_sync_status`, `travelclick_error_log`,
//! `travelclick_property_config`. A connection-pool constructor plus one
//! `models` + one `repositories` module, `sqlx::query_as::<_, T>` against
//! `FromRow` structs.

pub mod models;
pub mod repositories;

use std::time::Duration;

pub type DbPool = sqlx::PgPool;

/// Create the Postgres connection pool backing every repository in this
/// crate.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}
