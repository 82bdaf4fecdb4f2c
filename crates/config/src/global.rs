//! Global defaults layered via the `config` crate's builder: file + `.env` +
//! environment-variable overrides.

use serde::Deserialize;
use std::collections::HashMap;
use travelclick_common::ErrorKind;
use travelclick_domain::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct RetryPolicyDefaults {
    pub initial_delay_secs: u64,
    pub multiplier: f64,
    pub max_delay_secs: u64,
    pub max_attempts: u32,
}

impl Default for RetryPolicyDefaults {
    fn default() -> Self {
        Self {
            initial_delay_secs: 10,
            multiplier: 2.0,
            max_delay_secs: 300,
            max_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointDefaults {
    pub production_url: String,
    pub test_url: String,
    /// `endpoints.wsdl`; served verbatim by
    /// `GET /api/travelclick/soap/wsdl` when set, otherwise the gateway
    /// serves its own embedded WSDL document.
    #[serde(default)]
    pub wsdl_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalConfig {
    pub endpoints: EndpointDefaults,
    pub retry_policy: RetryPolicyDefaults,
    pub queue_names: HashMap<String, String>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub logging_level: String,
    /// Per-MessageType enable/disable switch (e.g. "Rates" => false).
    pub message_type_flags: HashMap<String, bool>,
    /// Linked-rate expansion flag.
    pub external_system_handles_linked_rates: bool,
    /// Reservation-completion chaining flag.
    pub auto_send_inventory_updates: bool,
}

impl GlobalConfig {
    /// Load from (in ascending precedence) `config/default.toml`, `.env`,
    /// then `TRAVELCLICK_*` environment variables, via the `config` crate's
    /// builder rather than hand-rolled `std::env::var` calls.
    pub fn load() -> Result<Self, ErrorKind> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("TRAVELCLICK").separator("__"));

        let built = builder.build().map_err(|e| ErrorKind::Configuration {
            message: format!("failed to build global configuration: {e}"),
        })?;

        built.try_deserialize().map_err(|e| ErrorKind::Configuration {
            message: format!("global configuration is invalid: {e}"),
        })
    }

    pub fn endpoint_for(&self, env: Environment) -> &str {
        match env {
            Environment::Production => &self.endpoints.production_url,
            Environment::Test => &self.endpoints.test_url,
        }
    }

    pub fn is_message_type_enabled(&self, message_type_name: &str) -> bool {
        self.message_type_flags
            .get(message_type_name)
            .copied()
            .unwrap_or(true)
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            endpoints: EndpointDefaults {
                production_url: "https://pms.ihotelier.com/HTNGService/services/HTNG2011BService"
                    .to_string(),
                test_url: "https://pmstest.ihotelier.com/HTNGService/services/HTNG2011BService"
                    .to_string(),
                wsdl_url: None,
            },
            retry_policy: RetryPolicyDefaults::default(),
            queue_names: HashMap::new(),
            connect_timeout_ms: 30_000,
            request_timeout_ms: 45_000,
            logging_level: "info".to_string(),
            message_type_flags: HashMap::new(),
            external_system_handles_linked_rates: false,
            auto_send_inventory_updates: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint_resolves_by_environment() {
        let global = GlobalConfig::default();
        assert!(global.endpoint_for(Environment::Production).contains("pms."));
        assert!(global.endpoint_for(Environment::Test).contains("pmstest."));
    }

    #[test]
    fn unflagged_message_type_defaults_enabled() {
        let global = GlobalConfig::default();
        assert!(global.is_message_type_enabled("Rates"));
    }

    #[test]
    fn flagged_message_type_is_respected() {
        let mut global = GlobalConfig::default();
        global.message_type_flags.insert("Rates".to_string(), false);
        assert!(!global.is_message_type_enabled("Rates"));
    }
}
