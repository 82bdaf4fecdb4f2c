//! Message-ID generation: unique, timestamped, and idempotent modes, each
//! with a parseable structure.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Namespace UUID this gateway uses for UUIDv5 idempotent message IDs.
/// Fixed so the same (hotel, type, payload) always yields the same ID
/// across process restarts.
const IDEMPOTENT_NAMESPACE: Uuid = Uuid::from_bytes([
    0x3a, 0x1e, 0x9c, 0x70, 0x4f, 0x2d, 0x4b, 0x8a, 0x9e, 0x41, 0x6c, 0x2b, 0x77, 0x0d, 0x5e, 0x12,
]);

/// A UUIDv4 message ID, unique per call.
pub fn generate_unique() -> String {
    Uuid::new_v4().to_string()
}

/// `tc-<unix_millis>-<short_random>` — sortable by creation time, and still
/// unique enough for audit-log display.
pub fn generate_timestamped(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis();
    let suffix = &Uuid::new_v4().simple().to_string()[..8];
    format!("tc-{millis}-{suffix}")
}

/// UUIDv5 over `hotel_code|message_type|sha256(payload)` — the same
/// business event always maps to the same ID, which is what the inbound
/// idempotency guard and outbound duplicate-send guard key on.
pub fn generate_idempotent(hotel_code: &str, message_type: &str, payload: &[u8]) -> String {
    let payload_hash = hex::encode(Sha256::digest(payload));
    let name = format!("{hotel_code}|{message_type}|{payload_hash}");
    Uuid::new_v5(&IDEMPOTENT_NAMESPACE, name.as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn unique_ids_differ() {
        assert_ne!(generate_unique(), generate_unique());
    }

    #[test]
    fn timestamped_id_embeds_millis() {
        let now = Utc.with_ymd_and_hms(2026, 7, 27, 12, 0, 0).unwrap();
        let id = generate_timestamped(now);
        assert!(id.starts_with(&format!("tc-{}", now.timestamp_millis())));
    }

    #[test]
    fn idempotent_id_is_stable_for_same_inputs() {
        let a = generate_idempotent("HOTEL001", "INVENTORY", b"payload-bytes");
        let b = generate_idempotent("HOTEL001", "INVENTORY", b"payload-bytes");
        assert_eq!(a, b);
    }

    #[test]
    fn idempotent_id_changes_with_payload() {
        let a = generate_idempotent("HOTEL001", "INVENTORY", b"payload-one");
        let b = generate_idempotent("HOTEL001", "INVENTORY", b"payload-two");
        assert_ne!(a, b);
    }
}
