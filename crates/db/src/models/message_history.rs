//! `travelclick_message_history` row: same shape as
//! `travelclick_log` plus `xml_hash UNIQUE(hash, confirmation_number)` used
//! by the inbound dispatcher's idempotency guard.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A row recording one inbound request and the response the gateway sent
/// back for it, keyed for replay by `(xml_sha256, confirmation_number)`.
#[derive(Debug, Clone, FromRow)]
pub struct MessageHistoryRow {
    pub id: Uuid,
    pub message_id: String,
    pub direction: String,
    pub message_type: String,
    pub property_id: Uuid,
    pub hotel_code: String,
    pub request_xml: Vec<u8>,
    pub response_xml: Option<Vec<u8>>,
    pub status: String,
    pub xml_sha256: String,
    pub confirmation_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
