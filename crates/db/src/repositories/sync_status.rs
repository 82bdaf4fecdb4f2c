//! `travelclick_sync_status` repository.

use chrono::{DateTime, Utc};
use sqlx::Error as SqlxError;
use travelclick_domain::{MessageType, SyncStatus};
use uuid::Uuid;

use crate::models::message_log::message_type_to_db;
use crate::models::sync_status::{status_value_to_db, SyncStatusRow};
use crate::DbPool;

#[derive(Clone)]
pub struct SyncStatusRepository {
    pool: DbPool,
}

impl SyncStatusRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn get(
        &self,
        property_id: Uuid,
        message_type: MessageType,
    ) -> Result<Option<SyncStatus>, SqlxError> {
        let row = sqlx::query_as::<_, SyncStatusRow>(
            "SELECT * FROM travelclick_sync_status WHERE property_id = $1 AND message_type = $2",
        )
        .bind(property_id)
        .bind(message_type_to_db(message_type))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(SyncStatusRow::into_domain))
    }

    /// Upsert the aggregate from a freshly-recomputed [`SyncStatus`] (the
    /// caller — `travelclick_messaging::sync_status` — owns the health-score
    /// and status-transition arithmetic; this repository only persists the
    /// result, which is updated from each terminal [`AuditEntry`] transition).
    #[allow(clippy::too_many_arguments)]
    pub async fn upsert(&self, status: &SyncStatus) -> Result<(), SqlxError> {
        sqlx::query(
            r#"
            INSERT INTO travelclick_sync_status (
                property_id, message_type, status, last_sync_attempt, last_successful_sync,
                records_total, records_processed, success_rate, retry_count,
                auto_retry_enabled, next_retry_at, max_retries, health_score
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (property_id, message_type) DO UPDATE SET
                status = EXCLUDED.status,
                last_sync_attempt = EXCLUDED.last_sync_attempt,
                last_successful_sync = EXCLUDED.last_successful_sync,
                records_total = EXCLUDED.records_total,
                records_processed = EXCLUDED.records_processed,
                success_rate = EXCLUDED.success_rate,
                retry_count = EXCLUDED.retry_count,
                auto_retry_enabled = EXCLUDED.auto_retry_enabled,
                next_retry_at = EXCLUDED.next_retry_at,
                max_retries = EXCLUDED.max_retries,
                health_score = EXCLUDED.health_score
            "#,
        )
        .bind(status.property_id)
        .bind(message_type_to_db(status.message_type))
        .bind(status_value_to_db(status.status))
        .bind(status.last_attempt)
        .bind(status.last_success)
        .bind(status.records_total)
        .bind(status.records_processed)
        .bind(status.success_rate)
        .bind(status.retry_count as i32)
        .bind(status.auto_retry_enabled)
        .bind(status.next_retry_at)
        .bind(status.max_retries as i32)
        .bind(status.health_score as i32)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// "needs-attention" query: anything failing or degraded.
    pub async fn needs_attention(&self) -> Result<Vec<SyncStatus>, SqlxError> {
        let rows = sqlx::query_as::<_, SyncStatusRow>(
            "SELECT * FROM travelclick_sync_status WHERE status IN ('FAILING', 'DEGRADED') ORDER BY health_score ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SyncStatusRow::into_domain).collect())
    }

    /// "low-success-rate(threshold)" query.
    pub async fn low_success_rate(&self, threshold: f64) -> Result<Vec<SyncStatus>, SqlxError> {
        let rows = sqlx::query_as::<_, SyncStatusRow>(
            "SELECT * FROM travelclick_sync_status WHERE success_rate < $1 ORDER BY success_rate ASC",
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SyncStatusRow::into_domain).collect())
    }

    /// "long-running(running > 30min)" query: a last attempt
    /// with no matching success more recent than `cutoff`.
    pub async fn long_running(&self, cutoff: DateTime<Utc>) -> Result<Vec<SyncStatus>, SqlxError> {
        let rows = sqlx::query_as::<_, SyncStatusRow>(
            r#"
            SELECT * FROM travelclick_sync_status
            WHERE status = 'SYNCING' AND last_sync_attempt < $1
            ORDER BY last_sync_attempt ASC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SyncStatusRow::into_domain).collect())
    }
}
