//! XSD schema registry.
//!
//! Schemas are embedded at compile time (`include_str!`) rather than read
//! from disk at runtime, so the gateway has no external file dependency in
//! production.

use travelclick_domain::MessageType;

const INVENTORY_XSD: &str = include_str!("../schemas/inventory.xsd");
const RATES_XSD: &str = include_str!("../schemas/rates.xsd");
const RESERVATION_XSD: &str = include_str!("../schemas/reservation.xsd");
const RESTRICTIONS_XSD: &str = include_str!("../schemas/restrictions.xsd");
const GROUP_BLOCK_XSD: &str = include_str!("../schemas/group_block.xsd");

/// Returns the XSD content registered for a MessageType, or `None` for
/// message types that have no outbound schema (RESPONSE, UNKNOWN).
pub fn xsd_for(message_type: MessageType) -> Option<&'static str> {
    match message_type {
        MessageType::Inventory => Some(INVENTORY_XSD),
        MessageType::Rates => Some(RATES_XSD),
        MessageType::Reservation => Some(RESERVATION_XSD),
        MessageType::Restrictions => Some(RESTRICTIONS_XSD),
        MessageType::GroupBlock => Some(GROUP_BLOCK_XSD),
        MessageType::Response | MessageType::Unknown => None,
    }
}

/// A logical path identifying the schema, used in log lines and error
/// context rather than for file access.
pub fn xsd_path_for(message_type: MessageType) -> Option<&'static str> {
    match message_type {
        MessageType::Inventory => Some("schemas/inventory.xsd"),
        MessageType::Rates => Some("schemas/rates.xsd"),
        MessageType::Reservation => Some("schemas/reservation.xsd"),
        MessageType::Restrictions => Some("schemas/restrictions.xsd"),
        MessageType::GroupBlock => Some("schemas/group_block.xsd"),
        MessageType::Response | MessageType::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_outbound_type_has_a_schema() {
        for mt in [
            MessageType::Inventory,
            MessageType::Rates,
            MessageType::Reservation,
            MessageType::Restrictions,
            MessageType::GroupBlock,
        ] {
            assert!(xsd_for(mt).is_some());
            assert!(xsd_path_for(mt).is_some());
        }
    }
}
