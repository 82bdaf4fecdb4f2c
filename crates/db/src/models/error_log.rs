//! `travelclick_error_log` row.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use travelclick_domain::ErrorLogEntry;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct ErrorLogRow {
    pub id: Uuid,
    pub travelclick_log_id: Uuid,
    pub error_kind: String,
    pub severity: i16,
    pub title: String,
    pub message: String,
    pub context: serde_json::Value,
    pub can_retry: bool,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ErrorLogRow {
    pub fn into_domain(self) -> ErrorLogEntry {
        ErrorLogEntry {
            id: self.id,
            audit_entry_id: self.travelclick_log_id,
            error_kind: self.error_kind,
            severity: self.severity.clamp(1, 4) as u8,
            title: self.title,
            message: self.message,
            context: self.context,
            can_retry: self.can_retry,
            resolved: self.resolved,
            resolved_at: self.resolved_at,
            resolved_by: self.resolved_by,
            created_at: self.created_at,
        }
    }
}
