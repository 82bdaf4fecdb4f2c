//! `travelclick_error_log` repository.

use sqlx::Error as SqlxError;
use travelclick_domain::ErrorLogEntry;
use uuid::Uuid;

use crate::models::error_log::ErrorLogRow;
use crate::DbPool;

#[derive(Clone)]
pub struct ErrorLogRepository {
    pool: DbPool,
}

impl ErrorLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        travelclick_log_id: Uuid,
        error_kind: &str,
        severity: u8,
        title: &str,
        message: &str,
        context: serde_json::Value,
        can_retry: bool,
    ) -> Result<ErrorLogEntry, SqlxError> {
        let row = sqlx::query_as::<_, ErrorLogRow>(
            r#"
            INSERT INTO travelclick_error_log (
                id, travelclick_log_id, error_kind, severity, title, message,
                context, can_retry, resolved, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, false, now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(travelclick_log_id)
        .bind(error_kind)
        .bind(severity as i16)
        .bind(title)
        .bind(message)
        .bind(context)
        .bind(can_retry)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_domain())
    }

    pub async fn resolve(
        &self,
        id: Uuid,
        resolved_by: &str,
    ) -> Result<Option<ErrorLogEntry>, SqlxError> {
        let row = sqlx::query_as::<_, ErrorLogRow>(
            r#"
            UPDATE travelclick_error_log
            SET resolved = true, resolved_at = now(), resolved_by = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(resolved_by)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ErrorLogRow::into_domain))
    }

    pub async fn list_unresolved(&self, travelclick_log_id: Uuid) -> Result<Vec<ErrorLogEntry>, SqlxError> {
        let rows = sqlx::query_as::<_, ErrorLogRow>(
            "SELECT * FROM travelclick_error_log WHERE travelclick_log_id = $1 AND resolved = false ORDER BY created_at DESC",
        )
        .bind(travelclick_log_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ErrorLogRow::into_domain).collect())
    }
}
