//! `travelclick_property_config` row.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use travelclick_domain::{Environment, MessageType, PropertyConfig};
use uuid::Uuid;

pub fn environment_to_db(e: Environment) -> &'static str {
    match e {
        Environment::Production => "production",
        Environment::Test => "test",
    }
}

pub fn environment_from_db(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        _ => Environment::Test,
    }
}

/// `travelclick_property_config`. `external_property_id` and
/// `property_code` are the two handles the inbound dispatcher's auth step
/// resolves credentials by.
/// `config_json` carries the enabled-message-types set and the per-property
/// retry-policy/timeout overrides that don't warrant their own columns.
#[derive(Debug, Clone, FromRow)]
pub struct PropertyConfigRow {
    pub property_id: Uuid,
    pub hotel_code: String,
    pub external_property_id: Option<String>,
    pub property_code: Option<String>,
    pub username: String,
    pub password: String,
    pub endpoint_url: String,
    pub environment: String,
    pub is_active: bool,
    pub config_json: serde_json::Value,
    pub last_health_check: Option<DateTime<Utc>>,
    pub healthy: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct PropertyConfigExtra {
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub enabled_message_types: Vec<String>,
}

impl PropertyConfigRow {
    pub fn into_domain(self) -> PropertyConfig {
        let extra: PropertyConfigExtra =
            serde_json::from_value(self.config_json).unwrap_or_default();
        let enabled_message_types = extra
            .enabled_message_types
            .iter()
            .map(|s| crate::models::message_log::message_type_from_db(s))
            .collect::<Vec<MessageType>>();
        PropertyConfig {
            property_id: self.property_id,
            hotel_code: self.hotel_code,
            username: self.username,
            password: self.password,
            endpoint_url: self.endpoint_url,
            environment: environment_from_db(&self.environment),
            connect_timeout_ms: extra.connect_timeout_ms.unwrap_or(30_000),
            request_timeout_ms: extra.request_timeout_ms.unwrap_or(45_000),
            enabled_message_types,
            active: self.is_active,
        }
    }

    /// Does `candidate` match this property by hotel code, external-property
    /// id, or property code?
    pub fn matches_identifier(&self, candidate: &str) -> bool {
        self.hotel_code == candidate
            || self.external_property_id.as_deref() == Some(candidate)
            || self.property_code.as_deref() == Some(candidate)
    }
}
