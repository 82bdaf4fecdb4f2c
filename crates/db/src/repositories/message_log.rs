//! `travelclick_log` / `travelclick_message_history` repository: a
//! `Repository { pool }` struct, `sqlx::query_as::<_, Row>` calls returning
//! `Result<_, sqlx::Error>`.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::Error as SqlxError;
use travelclick_domain::{AuditEntry, Direction, MessageStatus, MessageType};
use uuid::Uuid;

use crate::models::message_log::{
    direction_to_db, message_type_to_db, status_to_db, MessageLogRow,
};
use crate::models::message_history::MessageHistoryRow;
use crate::DbPool;

/// Error returned by [`MessageLogRepository::mark_transition`] when the
/// optimistic-concurrency check on `(id, version)` fails.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("database error: {0}")]
    Sql(#[from] SqlxError),
    #[error("version conflict updating message log row {id}")]
    VersionConflict { id: Uuid },
    #[error("message log row {id} not found")]
    NotFound { id: Uuid },
}

pub fn sha256_hex(payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hex::encode(hasher.finalize())
}

#[derive(Clone)]
pub struct MessageLogRepository {
    pool: DbPool,
}

impl MessageLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// `createPending(envelope)`.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_pending(
        &self,
        message_id: &str,
        direction: Direction,
        message_type: MessageType,
        property_id: Uuid,
        hotel_code: &str,
        request_xml: &[u8],
        parent_message_id: Option<&str>,
        batch_id: Option<&str>,
    ) -> Result<AuditEntry, SqlxError> {
        let xml_sha256 = sha256_hex(request_xml);
        let row = sqlx::query_as::<_, MessageLogRow>(
            r#"
            INSERT INTO travelclick_log (
                id, message_id, direction, message_type, property_id, hotel_code,
                request_xml, status, retry_count, xml_sha256, parent_message_id,
                batch_id, version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'PENDING', 0, $8, $9, $10, 1, now(), now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(message_id)
        .bind(direction_to_db(direction))
        .bind(message_type_to_db(message_type))
        .bind(property_id)
        .bind(hotel_code)
        .bind(request_xml)
        .bind(&xml_sha256)
        .bind(parent_message_id)
        .bind(batch_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_domain())
    }

    /// `markStarted(id)`: PENDING|RETRY_PENDING → PROCESSING.
    pub async fn mark_started(&self, id: Uuid, version: i32) -> Result<AuditEntry, UpdateError> {
        let row = sqlx::query_as::<_, MessageLogRow>(
            r#"
            UPDATE travelclick_log
            SET status = 'PROCESSING', started_at = now(), updated_at = now(), version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MessageLogRow::into_domain)
            .ok_or(UpdateError::VersionConflict { id })
    }

    /// `markCompleted(id, response, duration)`.
    pub async fn mark_completed(
        &self,
        id: Uuid,
        version: i32,
        response_xml: &[u8],
        duration_ms: i64,
    ) -> Result<AuditEntry, UpdateError> {
        let row = sqlx::query_as::<_, MessageLogRow>(
            r#"
            UPDATE travelclick_log
            SET status = 'COMPLETED', response_xml = $3, completed_at = now(),
                duration_ms = $4, updated_at = now(), version = version + 1,
                last_error_kind = NULL, last_error_message = NULL
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(version)
        .bind(response_xml)
        .bind(duration_ms)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MessageLogRow::into_domain)
            .ok_or(UpdateError::VersionConflict { id })
    }

    /// `markFailed(id, error-kind, message, response?)`.
    /// `terminal` selects FAILED_PERMANENT vs RETRY_PENDING per the caller's
    /// retry decision.
    pub async fn mark_failed(
        &self,
        id: Uuid,
        version: i32,
        error_kind: &str,
        error_message: &str,
        response_xml: Option<&[u8]>,
        terminal: bool,
    ) -> Result<AuditEntry, UpdateError> {
        let status = if terminal { "FAILED_PERMANENT" } else { "RETRY_PENDING" };
        let row = sqlx::query_as::<_, MessageLogRow>(
            r#"
            UPDATE travelclick_log
            SET status = $3, response_xml = COALESCE($4, response_xml),
                last_error_kind = $5, last_error_message = $6,
                completed_at = CASE WHEN $3 IN ('FAILED_PERMANENT', 'FAILED') THEN now() ELSE completed_at END,
                updated_at = now(), version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(version)
        .bind(status)
        .bind(response_xml)
        .bind(error_kind)
        .bind(error_message)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MessageLogRow::into_domain)
            .ok_or(UpdateError::VersionConflict { id })
    }

    /// Defer a job without consuming retry budget: circuit-open rejections
    /// never reach the network, so they set RETRY_PENDING and record the
    /// rejection reason without touching `retry_count` (unlike
    /// [`Self::mark_failed`] followed by [`Self::increment_retry`], which is
    /// for failures the transport actually attempted).
    pub async fn mark_retry_pending(
        &self,
        id: Uuid,
        version: i32,
        error_kind: &str,
        error_message: &str,
    ) -> Result<AuditEntry, UpdateError> {
        self.mark_failed(id, version, error_kind, error_message, None, false).await
    }

    /// Mark a job FAILED due to a business-logic rejection from the CRS
    /// (spec: distinct from FAILED_PERMANENT, which is reserved for
    /// transport/retry exhaustion).
    pub async fn mark_business_failed(
        &self,
        id: Uuid,
        version: i32,
        error_kind: &str,
        error_message: &str,
        response_xml: Option<&[u8]>,
    ) -> Result<AuditEntry, UpdateError> {
        let row = sqlx::query_as::<_, MessageLogRow>(
            r#"
            UPDATE travelclick_log
            SET status = 'FAILED', response_xml = COALESCE($3, response_xml),
                last_error_kind = $4, last_error_message = $5,
                completed_at = now(), updated_at = now(), version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(version)
        .bind(response_xml)
        .bind(error_kind)
        .bind(error_message)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MessageLogRow::into_domain)
            .ok_or(UpdateError::VersionConflict { id })
    }

    /// `incrementRetry(id)`. Bounded by `max_attempts` at the
    /// orchestrator level.
    pub async fn increment_retry(&self, id: Uuid, version: i32) -> Result<AuditEntry, UpdateError> {
        let row = sqlx::query_as::<_, MessageLogRow>(
            r#"
            UPDATE travelclick_log
            SET retry_count = retry_count + 1, updated_at = now(), version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MessageLogRow::into_domain)
            .ok_or(UpdateError::VersionConflict { id })
    }

    /// Cancel a job by marking its [`AuditEntry`] CANCELLED; the next
    /// transition check aborts before SEND.
    pub async fn cancel(&self, id: Uuid, version: i32) -> Result<AuditEntry, UpdateError> {
        let row = sqlx::query_as::<_, MessageLogRow>(
            r#"
            UPDATE travelclick_log
            SET status = 'CANCELLED', completed_at = now(), updated_at = now(), version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MessageLogRow::into_domain)
            .ok_or(UpdateError::VersionConflict { id })
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<AuditEntry>, SqlxError> {
        let row = sqlx::query_as::<_, MessageLogRow>("SELECT * FROM travelclick_log WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(MessageLogRow::into_domain))
    }

    /// `findByHash(sha)`, scoped to `travelclick_log` entries
    /// (outbound history); the inbound idempotency guard uses
    /// [`Self::find_inbound_by_hash`] against `travelclick_message_history`
    /// instead, since that table carries the confirmation-number key.
    pub async fn find_by_hash(&self, sha: &str) -> Result<Vec<AuditEntry>, SqlxError> {
        let rows = sqlx::query_as::<_, MessageLogRow>(
            "SELECT * FROM travelclick_log WHERE xml_sha256 = $1 ORDER BY created_at DESC",
        )
        .bind(sha)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MessageLogRow::into_domain).collect())
    }

    /// `thread(parent-id)`: every entry chained from
    /// `parent_message_id`, in creation order.
    pub async fn thread(&self, parent_message_id: &str) -> Result<Vec<AuditEntry>, SqlxError> {
        let rows = sqlx::query_as::<_, MessageLogRow>(
            "SELECT * FROM travelclick_log WHERE parent_message_id = $1 ORDER BY created_at ASC",
        )
        .bind(parent_message_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MessageLogRow::into_domain).collect())
    }

    /// `cleanup(olderThan)`: deletes terminal entries older
    /// than the cutoff, returning the number removed.
    pub async fn cleanup(&self, older_than: DateTime<Utc>) -> Result<u64, SqlxError> {
        let result = sqlx::query(
            r#"
            DELETE FROM travelclick_log
            WHERE created_at < $1
              AND status IN ('COMPLETED', 'FAILED', 'FAILED_PERMANENT', 'CANCELLED')
            "#,
        )
        .bind(older_than)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Insert the inbound request/response pair into
    /// `travelclick_message_history` for idempotency tracking.
    #[allow(clippy::too_many_arguments)]
    pub async fn record_inbound(
        &self,
        message_id: &str,
        message_type: MessageType,
        property_id: Uuid,
        hotel_code: &str,
        request_xml: &[u8],
        response_xml: &[u8],
        confirmation_number: Option<&str>,
        status: MessageStatus,
    ) -> Result<MessageHistoryRow, SqlxError> {
        let xml_sha256 = sha256_hex(request_xml);
        sqlx::query_as::<_, MessageHistoryRow>(
            r#"
            INSERT INTO travelclick_message_history (
                id, message_id, direction, message_type, property_id, hotel_code,
                request_xml, response_xml, status, xml_sha256, confirmation_number,
                created_at, updated_at
            )
            VALUES ($1, $2, 'INBOUND', $3, $4, $5, $6, $7, $8, $9, $10, now(), now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(message_id)
        .bind(message_type_to_db(message_type))
        .bind(property_id)
        .bind(hotel_code)
        .bind(request_xml)
        .bind(response_xml)
        .bind(status_to_db(status))
        .bind(&xml_sha256)
        .bind(confirmation_number)
        .fetch_one(&self.pool)
        .await
    }

    /// Idempotency lookup: an existing terminal entry with the same
    /// `(xml_sha256, confirmation_number)` pair has its response replayed
    /// verbatim.
    pub async fn find_inbound_by_hash(
        &self,
        xml_sha256: &str,
        confirmation_number: Option<&str>,
    ) -> Result<Option<MessageHistoryRow>, SqlxError> {
        sqlx::query_as::<_, MessageHistoryRow>(
            r#"
            SELECT * FROM travelclick_message_history
            WHERE xml_sha256 = $1
              AND confirmation_number IS NOT DISTINCT FROM $2
              AND status IN ('COMPLETED', 'FAILED', 'FAILED_PERMANENT', 'CANCELLED')
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(xml_sha256)
        .bind(confirmation_number)
        .fetch_optional(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_is_deterministic() {
        let a = sha256_hex(b"same payload");
        let b = sha256_hex(b"same payload");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn sha256_hex_differs_for_different_payloads() {
        assert_ne!(sha256_hex(b"one"), sha256_hex(b"two"));
    }
}
