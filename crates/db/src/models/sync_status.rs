//! `travelclick_sync_status` row.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use travelclick_domain::{MessageType, SyncStatus, SyncStatusValue};
use uuid::Uuid;

use crate::models::message_log::message_type_from_db;

pub fn message_type_to_db(t: MessageType) -> &'static str {
    crate::models::message_log::message_type_to_db(t)
}

pub fn status_value_to_db(s: SyncStatusValue) -> &'static str {
    match s {
        SyncStatusValue::Idle => "IDLE",
        SyncStatusValue::Syncing => "SYNCING",
        SyncStatusValue::Healthy => "HEALTHY",
        SyncStatusValue::Degraded => "DEGRADED",
        SyncStatusValue::Failing => "FAILING",
    }
}

pub fn status_value_from_db(s: &str) -> SyncStatusValue {
    match s {
        "SYNCING" => SyncStatusValue::Syncing,
        "HEALTHY" => SyncStatusValue::Healthy,
        "DEGRADED" => SyncStatusValue::Degraded,
        "FAILING" => SyncStatusValue::Failing,
        _ => SyncStatusValue::Idle,
    }
}

/// `travelclick_sync_status`, primary key `(property_id, message_type)`.
#[derive(Debug, Clone, FromRow)]
pub struct SyncStatusRow {
    pub property_id: Uuid,
    pub message_type: String,
    pub status: String,
    pub last_sync_attempt: Option<DateTime<Utc>>,
    pub last_successful_sync: Option<DateTime<Utc>>,
    pub records_total: i64,
    pub records_processed: i64,
    pub success_rate: f64,
    pub retry_count: i32,
    pub auto_retry_enabled: bool,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub max_retries: i32,
    pub health_score: i32,
}

impl SyncStatusRow {
    pub fn into_domain(self) -> SyncStatus {
        SyncStatus {
            property_id: self.property_id,
            message_type: message_type_from_db(&self.message_type),
            status: status_value_from_db(&self.status),
            last_attempt: self.last_sync_attempt,
            last_success: self.last_successful_sync,
            success_rate: self.success_rate,
            records_total: self.records_total,
            records_processed: self.records_processed,
            retry_count: self.retry_count.max(0) as u32,
            auto_retry_enabled: self.auto_retry_enabled,
            next_retry_at: self.next_retry_at,
            max_retries: self.max_retries.max(0) as u32,
            health_score: self.health_score.clamp(0, 100) as u8,
        }
    }
}
