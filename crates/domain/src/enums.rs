//! Enumerations shared across the gateway.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a message relative to this gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Inbound,
    Outbound,
}

/// The OTA/HTNG message families this gateway speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    Inventory,
    Rates,
    Reservation,
    Restrictions,
    GroupBlock,
    Response,
    Unknown,
}

impl MessageType {
    /// Body root element name for outbound envelopes.
    pub fn body_root(self) -> Option<&'static str> {
        match self {
            MessageType::Inventory => Some("OTA_HotelInvCountNotifRQ"),
            MessageType::Rates => Some("OTA_HotelRateNotifRQ"),
            MessageType::Reservation => Some("OTA_HotelResNotifRQ"),
            MessageType::Restrictions => Some("OTA_HotelAvailNotifRQ"),
            MessageType::GroupBlock => Some("OTA_HotelInvBlockNotifRQ"),
            MessageType::Response | MessageType::Unknown => None,
        }
    }

    /// Reverse lookup used by the inbound classifier.
    pub fn from_body_root(root: &str) -> MessageType {
        match root {
            "OTA_HotelInvCountNotifRQ" => MessageType::Inventory,
            "OTA_HotelRateNotifRQ" => MessageType::Rates,
            "OTA_HotelResNotifRQ" => MessageType::Reservation,
            "OTA_HotelAvailNotifRQ" => MessageType::Restrictions,
            "OTA_HotelInvBlockNotifRQ" => MessageType::GroupBlock,
            _ if root.ends_with("RS") => MessageType::Response,
            _ => MessageType::Unknown,
        }
    }

    /// Types that require a non-empty hotel code on their envelope.
    pub fn requires_hotel_code(self) -> bool {
        matches!(
            self,
            MessageType::Inventory
                | MessageType::Rates
                | MessageType::Reservation
                | MessageType::Restrictions
                | MessageType::GroupBlock
        )
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageType::Inventory => "INVENTORY",
            MessageType::Rates => "RATES",
            MessageType::Reservation => "RESERVATION",
            MessageType::Restrictions => "RESTRICTIONS",
            MessageType::GroupBlock => "GROUP_BLOCK",
            MessageType::Response => "RESPONSE",
            MessageType::Unknown => "UNKNOWN",
        };
        write!(f, "{s}")
    }
}

/// Inventory count-type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum CountType {
    Physical = 1,
    Available = 2,
    DefiniteSold = 4,
    TentativeSold = 5,
    OutOfOrder = 6,
    Oversell = 99,
}

impl CountType {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<CountType> {
        match code {
            1 => Some(CountType::Physical),
            2 => Some(CountType::Available),
            4 => Some(CountType::DefiniteSold),
            5 => Some(CountType::TentativeSold),
            6 => Some(CountType::OutOfOrder),
            99 => Some(CountType::Oversell),
            _ => None,
        }
    }
}

/// Per (property, message-type) lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatusValue {
    Idle,
    Syncing,
    Healthy,
    Degraded,
    Failing,
}

/// Audit-entry lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    FailedPermanent,
    RetryPending,
    Partial,
    Cancelled,
    OnHold,
}

impl MessageStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MessageStatus::Completed
                | MessageStatus::Failed
                | MessageStatus::FailedPermanent
                | MessageStatus::Cancelled
        )
    }
}

/// Reservation sub-type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationType {
    Transient,
    TravelAgency,
    Corporate,
    Package,
    Group,
    AlternatePayment,
}

/// Reservation transaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    New,
    Modify,
    Cancel,
}

/// Configuration cache scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigScope {
    Global,
    Property,
    Credentials,
    Cache,
}

/// Target endpoint environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Test,
}

/// Rate builder operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateOperationType {
    RateUpdate,
    RateCreation,
    FullSync,
    DeltaUpdate,
    Inactive,
    RemoveRoomTypes,
}

/// Inventory builder mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryMode {
    Delta,
    Overlay,
}

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitStateValue {
    Closed,
    Open,
    HalfOpen,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_type_roundtrips_body_root() {
        for mt in [
            MessageType::Inventory,
            MessageType::Rates,
            MessageType::Reservation,
            MessageType::Restrictions,
            MessageType::GroupBlock,
        ] {
            let root = mt.body_root().unwrap();
            assert_eq!(MessageType::from_body_root(root), mt);
            assert!(mt.requires_hotel_code());
        }
    }

    #[test]
    fn count_type_code_roundtrip() {
        for ct in [
            CountType::Physical,
            CountType::Available,
            CountType::DefiniteSold,
            CountType::TentativeSold,
            CountType::OutOfOrder,
            CountType::Oversell,
        ] {
            assert_eq!(CountType::from_code(ct.code()), Some(ct));
        }
        assert_eq!(CountType::from_code(3), None);
    }
}
