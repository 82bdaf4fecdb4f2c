//! Data model value objects, validated at construction.

use crate::enums::{
    CircuitStateValue, ConfigScope, CountType, Environment, InventoryMode, MessageStatus,
    MessageType, RateOperationType, ReservationType, SyncStatusValue, TransactionType,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use travelclick_common::{ErrorKind, FieldViolation};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn violation_err(field: &str, rule: &str, message: impl Into<String>) -> ErrorKind {
    ErrorKind::Validation {
        message: message.into(),
        violations: vec![FieldViolation::new(field, rule)],
        warnings: vec![],
    }
}

/// Immutable envelope around one message crossing the wire, either direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEnvelope {
    pub message_id: String,
    pub direction: crate::enums::Direction,
    pub message_type: MessageType,
    pub hotel_code: String,
    pub property_id: Uuid,
    pub payload: Vec<u8>,
    pub correlation_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MessageEnvelope {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        message_id: impl Into<String>,
        direction: crate::enums::Direction,
        message_type: MessageType,
        hotel_code: impl Into<String>,
        property_id: Uuid,
        payload: Vec<u8>,
        correlation_id: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ErrorKind> {
        let message_id = message_id.into();
        if message_id.trim().is_empty() {
            return Err(violation_err(
                "message_id",
                "non_empty",
                "message_id must not be empty",
            ));
        }
        let hotel_code = hotel_code.into();
        if message_type.requires_hotel_code() && hotel_code.trim().is_empty() {
            return Err(violation_err(
                "hotel_code",
                "required_for_type",
                format!("{message_type} requires a non-empty hotel_code"),
            ));
        }
        Ok(Self {
            message_id,
            direction,
            message_type,
            hotel_code,
            property_id,
            payload,
            correlation_id,
            created_at,
        })
    }
}

/// One room type's counts over a date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    pub hotel_code: String,
    pub room_type_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub counts: BTreeMap<CountType, u32>,
    /// Delta (apply on top of existing counts) vs. Overlay (replace them
    /// outright) — caller-signaled, not derived from which count types are
    /// present, since a calculated-method update (counts 4/5/6 together) can
    /// legitimately be either.
    pub mode: InventoryMode,
}

impl InventoryItem {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        hotel_code: impl Into<String>,
        room_type_code: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        counts: BTreeMap<CountType, u32>,
        mode: InventoryMode,
    ) -> Result<Self, ErrorKind> {
        let item = Self {
            hotel_code: hotel_code.into(),
            room_type_code: room_type_code.into(),
            start_date,
            end_date,
            counts,
            mode,
        };
        item.validate()?;
        Ok(item)
    }

    fn validate(&self) -> Result<(), ErrorKind> {
        if self.end_date < self.start_date {
            return Err(violation_err(
                "end_date",
                "end_gte_start",
                "end_date must be on or after start_date",
            ));
        }
        let span = (self.end_date - self.start_date).num_days();
        if span > 365 {
            return Err(violation_err(
                "end_date",
                "max_range_days",
                "inventory date range may not exceed 365 days",
            ));
        }

        let has_calculated = self.counts.contains_key(&CountType::DefiniteSold)
            || self.counts.contains_key(&CountType::TentativeSold)
            || self.counts.contains_key(&CountType::OutOfOrder);
        let has_direct = self.counts.contains_key(&CountType::Available);

        if has_calculated && has_direct {
            return Err(violation_err(
                "counts",
                "calculated_xor_direct",
                "calculated-method count types {4,5,6} and direct-method {2} are mutually exclusive",
            ));
        }
        if has_calculated
            && !(self.counts.contains_key(&CountType::DefiniteSold)
                && self.counts.contains_key(&CountType::TentativeSold)
                && self.counts.contains_key(&CountType::OutOfOrder))
        {
            return Err(violation_err(
                "counts",
                "calculated_requires_all",
                "calculated method requires Definite-Sold, Tentative-Sold, and Out-of-Order",
            ));
        }

        if let Some(&physical) = self.counts.get(&CountType::Physical) {
            let sold_tentative_ooo: u32 = [
                CountType::DefiniteSold,
                CountType::TentativeSold,
                CountType::OutOfOrder,
            ]
            .iter()
            .filter_map(|ct| self.counts.get(ct))
            .sum();
            let oversell = self.counts.get(&CountType::Oversell).copied().unwrap_or(0);
            let required = sold_tentative_ooo.saturating_sub(oversell);
            if physical < required {
                return Err(violation_err(
                    "counts",
                    "physical_gte_sold_minus_oversell",
                    "Physical must be >= Sold+Tentative+OOO - Oversell",
                ));
            }
        }

        Ok(())
    }
}

/// A single rate line within a [`RatePlan`].
#[derive(Debug, Clone, PartialEq)]
pub struct RateLine {
    pub room_type_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guest_amounts: Vec<f64>,
    pub commissionable: Option<bool>,
    pub market_code: Option<String>,
    pub max_guests: Option<u32>,
    pub meal_plan: Option<String>,
}

/// A rate plan, optionally linked to a master plan via a fixed offset or percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct RatePlan {
    pub plan_code: String,
    pub currency: String,
    pub linked_to: Option<String>,
    pub offset_amount: Option<f64>,
    pub offset_percent: Option<f64>,
    pub rates: Vec<RateLine>,
    pub operation: RateOperationType,
}

impl RatePlan {
    pub fn new(
        plan_code: impl Into<String>,
        currency: impl Into<String>,
        linked_to: Option<String>,
        offset_amount: Option<f64>,
        offset_percent: Option<f64>,
        rates: Vec<RateLine>,
        operation: RateOperationType,
    ) -> Result<Self, ErrorKind> {
        let plan = Self {
            plan_code: plan_code.into(),
            currency: currency.into(),
            linked_to,
            offset_amount,
            offset_percent,
            rates,
            operation,
        };
        plan.validate()?;
        Ok(plan)
    }

    fn validate(&self) -> Result<(), ErrorKind> {
        if self.offset_amount.is_some() && self.offset_percent.is_some() {
            return Err(violation_err(
                "offset",
                "mutually_exclusive",
                "offset_amount and offset_percent are mutually exclusive",
            ));
        }
        for line in &self.rates {
            if line.guest_amounts.len() < 2 {
                return Err(violation_err(
                    "rates.guest_amounts",
                    "first_second_adult_mandatory",
                    "1st-adult and 2nd-adult amounts are mandatory",
                ));
            }
            if line.guest_amounts.iter().any(|&amt| amt < 0.0) {
                return Err(violation_err(
                    "rates.guest_amounts",
                    "non_negative",
                    "guest amounts must be >= 0",
                ));
            }
        }
        Ok(())
    }

    /// Whether this plan is derived from a master via `linked_to`.
    pub fn is_linked(&self) -> bool {
        self.linked_to.is_some()
    }
}

/// A single occupied room-night within a [`Reservation`].
#[derive(Debug, Clone, PartialEq)]
pub struct RoomStay {
    pub room_type_code: String,
    pub rate_per_night: f64,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

/// A reservation notification: a new booking, a modification, or a cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub confirmation_number: Option<String>,
    pub transaction_type: TransactionType,
    pub reservation_type: ReservationType,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    pub room_stays: Vec<RoomStay>,
    pub special_requests: Vec<String>,
    pub agency_iata: Option<String>,
    pub corporate_id: Option<String>,
    pub group_block_code: Option<String>,
}

impl Reservation {
    pub fn new(
        confirmation_number: Option<String>,
        transaction_type: TransactionType,
        reservation_type: ReservationType,
        arrival: NaiveDate,
        departure: NaiveDate,
        room_stays: Vec<RoomStay>,
        special_requests: Vec<String>,
        agency_iata: Option<String>,
        corporate_id: Option<String>,
        group_block_code: Option<String>,
    ) -> Result<Self, ErrorKind> {
        let reservation = Self {
            confirmation_number,
            transaction_type,
            reservation_type,
            arrival,
            departure,
            room_stays,
            special_requests,
            agency_iata,
            corporate_id,
            group_block_code,
        };
        reservation.validate()?;
        Ok(reservation)
    }

    fn validate(&self) -> Result<(), ErrorKind> {
        if self.departure < self.arrival {
            return Err(violation_err(
                "departure",
                "after_arrival",
                "departure must be on or after arrival",
            ));
        }
        match self.transaction_type {
            TransactionType::Modify | TransactionType::Cancel => {
                if self.confirmation_number.is_none() {
                    return Err(violation_err(
                        "confirmation_number",
                        "required_for_modify_cancel",
                        "MODIFY/CANCEL require a confirmation_number",
                    ));
                }
            }
            TransactionType::New => {}
        }
        match self.reservation_type {
            ReservationType::TravelAgency if self.agency_iata.is_none() => {
                return Err(violation_err(
                    "agency_iata",
                    "required_for_travel_agency",
                    "TRAVEL_AGENCY reservations require an agency profile",
                ));
            }
            ReservationType::Corporate if self.corporate_id.is_none() => {
                return Err(violation_err(
                    "corporate_id",
                    "required_for_corporate",
                    "CORPORATE reservations require a corporate profile",
                ));
            }
            ReservationType::Group if self.group_block_code.is_none() => {
                return Err(violation_err(
                    "group_block_code",
                    "required_for_group",
                    "GROUP reservations require a group-block reference",
                ));
            }
            _ => {}
        }
        Ok(())
    }
}

/// A single restriction change for one room-type/date-range.
#[derive(Debug, Clone, PartialEq)]
pub struct RestrictionItem {
    pub hotel_code: String,
    pub room_type_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub restriction_code: String,
    pub value: Option<u32>,
}

impl RestrictionItem {
    pub fn new(
        hotel_code: impl Into<String>,
        room_type_code: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        restriction_code: impl Into<String>,
        value: Option<u32>,
    ) -> Result<Self, ErrorKind> {
        let item = Self {
            hotel_code: hotel_code.into(),
            room_type_code: room_type_code.into(),
            start_date,
            end_date,
            restriction_code: restriction_code.into(),
            value,
        };
        item.validate()?;
        Ok(item)
    }

    fn validate(&self) -> Result<(), ErrorKind> {
        if self.end_date < self.start_date {
            return Err(violation_err(
                "end_date",
                "end_gte_start",
                "end_date must be on or after start_date",
            ));
        }
        if self.restriction_code.trim().is_empty() {
            return Err(violation_err(
                "restriction_code",
                "non_empty",
                "restriction_code must not be empty",
            ));
        }
        Ok(())
    }
}

/// A group-block allotment for one room-type/date-range.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBlock {
    pub hotel_code: String,
    pub block_code: String,
    pub room_type_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub allotment: u32,
}

impl GroupBlock {
    pub fn new(
        hotel_code: impl Into<String>,
        block_code: impl Into<String>,
        room_type_code: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        allotment: u32,
    ) -> Result<Self, ErrorKind> {
        let block = Self {
            hotel_code: hotel_code.into(),
            block_code: block_code.into(),
            room_type_code: room_type_code.into(),
            start_date,
            end_date,
            allotment,
        };
        block.validate()?;
        Ok(block)
    }

    fn validate(&self) -> Result<(), ErrorKind> {
        if self.end_date < self.start_date {
            return Err(violation_err(
                "end_date",
                "end_gte_start",
                "end_date must be on or after start_date",
            ));
        }
        if self.block_code.trim().is_empty() {
            return Err(violation_err(
                "block_code",
                "non_empty",
                "block_code must not be empty",
            ));
        }
        Ok(())
    }
}

/// Application-level mirror of the `travelclick_log` row; `travelclick-db`
/// maps this to/from its `sqlx::FromRow` row.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub id: Uuid,
    pub message_id: String,
    pub job_id: Option<String>,
    pub direction: crate::enums::Direction,
    pub message_type: MessageType,
    pub property_id: Uuid,
    pub hotel_code: String,
    pub request_xml: Option<Vec<u8>>,
    pub response_xml: Option<Vec<u8>>,
    pub status: MessageStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    pub retry_count: u32,
    pub last_error_kind: Option<String>,
    pub last_error_message: Option<String>,
    pub xml_sha256: String,
    pub parent_message_id: Option<String>,
    pub batch_id: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per (property, message-type) health aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncStatus {
    pub property_id: Uuid,
    pub message_type: MessageType,
    pub status: SyncStatusValue,
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub success_rate: f64,
    pub records_total: i64,
    pub records_processed: i64,
    pub retry_count: u32,
    pub auto_retry_enabled: bool,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub max_retries: u32,
    pub health_score: u8,
}

/// `hotel_code` must match `^[A-Za-z0-9_-]{1,20}$`; `validator`'s built-in
/// `length`/`regex` validators cover the length half, this covers the
/// character-set half without pulling in the `regex` crate (not part of
/// this workspace's stack).
fn validate_hotel_code_charset(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        Ok(())
    } else {
        Err(ValidationError::new("pattern:^[A-Za-z0-9_-]{1,20}$"))
    }
}

fn validate_https_url(value: &str) -> Result<(), ValidationError> {
    if value.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_https"))
    }
}

/// Per-property credentials, endpoint, and enabled message types.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct PropertyConfig {
    pub property_id: Uuid,
    #[validate(length(min = 1, max = 20), custom(function = "validate_hotel_code_charset"))]
    pub hotel_code: String,
    pub username: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(custom(function = "validate_https_url"))]
    pub endpoint_url: String,
    pub environment: Environment,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub enabled_message_types: Vec<MessageType>,
    pub active: bool,
}

impl PropertyConfig {
    /// Runs the `validator`-derived field checks (spec §4.1
    /// `validate(property-id) -> issue-list`) and flattens the result into
    /// the same `FieldViolation` shape every other value object's
    /// constructor-level validation reports.
    pub fn validate(&self) -> Result<Vec<FieldViolation>, ErrorKind> {
        match Validate::validate(self) {
            Ok(()) => Ok(Vec::new()),
            Err(errors) => {
                let violations = errors
                    .field_errors()
                    .into_iter()
                    .flat_map(|(field, errs)| {
                        errs.iter().map(move |e| FieldViolation::new(field, e.code.to_string()))
                    })
                    .collect();
                Ok(violations)
            }
        }
    }
}

/// Circuit-breaker state. Process-wide, keyed externally by endpoint URL.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitState {
    pub state: CircuitStateValue,
    pub consecutive_failures: u32,
    pub opened_at: Option<DateTime<Utc>>,
}

impl Default for CircuitState {
    fn default() -> Self {
        Self {
            state: CircuitStateValue::Closed,
            consecutive_failures: 0,
            opened_at: None,
        }
    }
}

/// An error log entry associated with one audit entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorLogEntry {
    pub id: Uuid,
    pub audit_entry_id: Uuid,
    pub error_kind: String,
    pub severity: u8,
    pub title: String,
    pub message: String,
    pub context: serde_json::Value,
    pub can_retry: bool,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn inventory_delta_accepts_available_alone() {
        let mut counts = BTreeMap::new();
        counts.insert(CountType::Available, 15);
        let item = InventoryItem::new(
            "HOTEL001",
            "KING",
            date(2026, 8, 1),
            date(2026, 8, 2),
            counts,
            crate::enums::InventoryMode::Delta,
        )
        .unwrap();
        assert_eq!(item.mode, crate::enums::InventoryMode::Delta);
    }

    #[test]
    fn inventory_calculated_method_can_be_a_delta_update() {
        let mut counts = BTreeMap::new();
        counts.insert(CountType::DefiniteSold, 8);
        counts.insert(CountType::TentativeSold, 2);
        counts.insert(CountType::OutOfOrder, 1);
        let item = InventoryItem::new(
            "HOTEL001",
            "KING",
            date(2026, 8, 1),
            date(2026, 8, 2),
            counts,
            crate::enums::InventoryMode::Delta,
        )
        .unwrap();
        assert_eq!(item.mode, crate::enums::InventoryMode::Delta);
    }

    #[test]
    fn inventory_single_count_can_be_an_overlay_replacement() {
        let mut counts = BTreeMap::new();
        counts.insert(CountType::Available, 15);
        let item = InventoryItem::new(
            "HOTEL001",
            "KING",
            date(2026, 8, 1),
            date(2026, 8, 2),
            counts,
            crate::enums::InventoryMode::Overlay,
        )
        .unwrap();
        assert_eq!(item.mode, crate::enums::InventoryMode::Overlay);
    }

    #[test]
    fn inventory_calculated_requires_all_three() {
        let mut counts = BTreeMap::new();
        counts.insert(CountType::DefiniteSold, 8);
        counts.insert(CountType::Physical, 30);
        let err = InventoryItem::new(
            "HOTEL001",
            "KING",
            date(2026, 8, 1),
            date(2026, 8, 2),
            counts,
            crate::enums::InventoryMode::Overlay,
        );
        assert!(err.is_err());
    }

    #[test]
    fn inventory_calculated_and_direct_are_exclusive() {
        let mut counts = BTreeMap::new();
        counts.insert(CountType::DefiniteSold, 8);
        counts.insert(CountType::TentativeSold, 2);
        counts.insert(CountType::OutOfOrder, 1);
        counts.insert(CountType::Available, 5);
        let err = InventoryItem::new(
            "HOTEL001",
            "KING",
            date(2026, 8, 1),
            date(2026, 8, 2),
            counts,
            crate::enums::InventoryMode::Overlay,
        );
        assert!(err.is_err());
    }

    #[test]
    fn inventory_physical_must_cover_sold_minus_oversell() {
        let mut counts = BTreeMap::new();
        counts.insert(CountType::DefiniteSold, 8);
        counts.insert(CountType::TentativeSold, 2);
        counts.insert(CountType::OutOfOrder, 1);
        counts.insert(CountType::Physical, 5);
        let err = InventoryItem::new(
            "HOTEL001",
            "KING",
            date(2026, 8, 1),
            date(2026, 8, 2),
            counts,
            crate::enums::InventoryMode::Overlay,
        );
        assert!(err.is_err());
    }

    #[test]
    fn rate_plan_rejects_both_offsets() {
        let err = RatePlan::new(
            "AAA",
            "USD",
            Some("BAR".into()),
            Some(10.0),
            Some(5.0),
            vec![],
            RateOperationType::RateUpdate,
        );
        assert!(err.is_err());
    }

    #[test]
    fn rate_plan_requires_first_and_second_adult() {
        let line = RateLine {
            room_type_code: "KING".into(),
            start_date: date(2026, 8, 1),
            end_date: date(2026, 8, 10),
            guest_amounts: vec![150.0],
            commissionable: None,
            market_code: None,
            max_guests: None,
            meal_plan: None,
        };
        let err = RatePlan::new(
            "BAR",
            "USD",
            None,
            None,
            None,
            vec![line],
            RateOperationType::RateUpdate,
        );
        assert!(err.is_err());
    }

    #[test]
    fn reservation_requires_confirmation_for_cancel() {
        let err = Reservation::new(
            None,
            TransactionType::Cancel,
            ReservationType::Transient,
            date(2026, 8, 1),
            date(2026, 8, 2),
            vec![],
            vec![],
            None,
            None,
            None,
        );
        assert!(err.is_err());
    }

    #[test]
    fn reservation_travel_agency_requires_iata() {
        let err = Reservation::new(
            Some("CONF123".into()),
            TransactionType::New,
            ReservationType::TravelAgency,
            date(2026, 8, 1),
            date(2026, 8, 2),
            vec![],
            vec![],
            None,
            None,
            None,
        );
        assert!(err.is_err());
    }

    #[test]
    fn restriction_item_rejects_inverted_range() {
        let err = RestrictionItem::new("HOTEL001", "KING", date(2026, 8, 5), date(2026, 8, 1), "MIN_LOS", Some(2));
        assert!(err.is_err());
    }

    #[test]
    fn group_block_rejects_empty_block_code() {
        let err = GroupBlock::new("HOTEL001", "", "KING", date(2026, 8, 1), date(2026, 8, 5), 10);
        assert!(err.is_err());
    }

    #[test]
    fn property_config_validates_hotel_code_pattern() {
        let cfg = PropertyConfig {
            property_id: Uuid::new_v4(),
            hotel_code: "bad hotel code!".into(),
            username: "u".into(),
            password: "longenoughpassword".into(),
            endpoint_url: "https://example.com".into(),
            environment: Environment::Test,
            connect_timeout_ms: 5000,
            request_timeout_ms: 30000,
            enabled_message_types: vec![],
            active: true,
        };
        let violations = cfg.validate().unwrap();
        assert!(violations.iter().any(|v| v.field == "hotel_code"));
    }
}
