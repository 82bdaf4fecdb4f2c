//! `travelclick_log` row, backing [`travelclick_domain::AuditEntry`].

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use travelclick_domain::{AuditEntry, Direction, MessageStatus, MessageType};
use uuid::Uuid;

/// Direction/MessageType/MessageStatus are stored as plain text columns
/// rather than Postgres enum types — the gateway owns no migration tooling
/// of its own, so a
/// text column with an application-level closed set is simpler to evolve.
pub fn direction_to_db(d: Direction) -> &'static str {
    match d {
        Direction::Inbound => "INBOUND",
        Direction::Outbound => "OUTBOUND",
    }
}

pub fn direction_from_db(s: &str) -> Direction {
    match s {
        "INBOUND" => Direction::Inbound,
        _ => Direction::Outbound,
    }
}

pub fn message_type_to_db(t: MessageType) -> &'static str {
    match t {
        MessageType::Inventory => "INVENTORY",
        MessageType::Rates => "RATES",
        MessageType::Reservation => "RESERVATION",
        MessageType::Restrictions => "RESTRICTIONS",
        MessageType::GroupBlock => "GROUP_BLOCK",
        MessageType::Response => "RESPONSE",
        MessageType::Unknown => "UNKNOWN",
    }
}

pub fn message_type_from_db(s: &str) -> MessageType {
    match s {
        "INVENTORY" => MessageType::Inventory,
        "RATES" => MessageType::Rates,
        "RESERVATION" => MessageType::Reservation,
        "RESTRICTIONS" => MessageType::Restrictions,
        "GROUP_BLOCK" => MessageType::GroupBlock,
        "RESPONSE" => MessageType::Response,
        _ => MessageType::Unknown,
    }
}

pub fn status_to_db(s: MessageStatus) -> &'static str {
    match s {
        MessageStatus::Pending => "PENDING",
        MessageStatus::Processing => "PROCESSING",
        MessageStatus::Completed => "COMPLETED",
        MessageStatus::Failed => "FAILED",
        MessageStatus::FailedPermanent => "FAILED_PERMANENT",
        MessageStatus::RetryPending => "RETRY_PENDING",
        MessageStatus::Partial => "PARTIAL",
        MessageStatus::Cancelled => "CANCELLED",
        MessageStatus::OnHold => "ON_HOLD",
    }
}

pub fn status_from_db(s: &str) -> MessageStatus {
    match s {
        "PROCESSING" => MessageStatus::Processing,
        "COMPLETED" => MessageStatus::Completed,
        "FAILED" => MessageStatus::Failed,
        "FAILED_PERMANENT" => MessageStatus::FailedPermanent,
        "RETRY_PENDING" => MessageStatus::RetryPending,
        "PARTIAL" => MessageStatus::Partial,
        "CANCELLED" => MessageStatus::Cancelled,
        "ON_HOLD" => MessageStatus::OnHold,
        _ => MessageStatus::Pending,
    }
}

/// `travelclick_log`.
#[derive(Debug, Clone, FromRow)]
pub struct MessageLogRow {
    pub id: Uuid,
    pub message_id: String,
    pub job_id: Option<String>,
    pub direction: String,
    pub message_type: String,
    pub property_id: Uuid,
    pub hotel_code: String,
    pub request_xml: Option<Vec<u8>>,
    pub response_xml: Option<Vec<u8>>,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    pub retry_count: i32,
    pub last_error_kind: Option<String>,
    pub last_error_message: Option<String>,
    pub xml_sha256: String,
    pub parent_message_id: Option<String>,
    pub batch_id: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MessageLogRow {
    pub fn into_domain(self) -> AuditEntry {
        AuditEntry {
            id: self.id,
            message_id: self.message_id,
            job_id: self.job_id,
            direction: direction_from_db(&self.direction),
            message_type: message_type_from_db(&self.message_type),
            property_id: self.property_id,
            hotel_code: self.hotel_code,
            request_xml: self.request_xml,
            response_xml: self.response_xml,
            status: status_from_db(&self.status),
            started_at: self.started_at,
            completed_at: self.completed_at,
            duration_ms: self.duration_ms,
            retry_count: self.retry_count.max(0) as u32,
            last_error_kind: self.last_error_kind,
            last_error_message: self.last_error_message,
            xml_sha256: self.xml_sha256,
            parent_message_id: self.parent_message_id,
            batch_id: self.batch_id,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
