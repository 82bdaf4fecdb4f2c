//! Application state assembled once at startup and shared across every
//! axum handler.

use std::sync::Arc;

use async_trait::async_trait;
use travelclick_common::ErrorKind;
use travelclick_config::{ConfigService, GlobalConfig, PropertyConfigSource};
use travelclick_db::repositories::{
    ErrorLogRepository, MessageLogRepository, PropertyConfigRepository, SyncStatusRepository,
};
use travelclick_db::DbPool;
use travelclick_domain::PropertyConfig;
use travelclick_messaging::{CircuitBreaker, ExponentialBackoff, RetryStrategy};
use travelclick_transport::{SoapTransport, TransportConfig};
use uuid::Uuid;

use crate::services::dispatcher::InboundDispatcher;
use crate::services::orchestrator::Orchestrator;

/// Bridges `travelclick-config`'s storage-agnostic trait to the Postgres
/// repository this host actually uses, so `travelclick-config` itself never
/// depends on `travelclick-db`.
pub struct PropertyConfigRepoSource {
    repo: PropertyConfigRepository,
}

impl PropertyConfigRepoSource {
    pub fn new(repo: PropertyConfigRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl PropertyConfigSource for PropertyConfigRepoSource {
    async fn load(&self, property_id: Uuid) -> Result<Option<PropertyConfig>, ErrorKind> {
        self.repo.get(property_id).await.map_err(|e| ErrorKind::Configuration {
            message: format!("failed to load property config: {e}"),
        })
    }

    async fn load_by_identifier(&self, identifier: &str) -> Result<Option<PropertyConfig>, ErrorKind> {
        self.repo
            .find_by_identifier(identifier)
            .await
            .map_err(|e| ErrorKind::Configuration {
                message: format!("failed to resolve property by identifier: {e}"),
            })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConfigService>,
    pub message_log: Arc<MessageLogRepository>,
    pub sync_status_repo: Arc<SyncStatusRepository>,
    pub error_log_repo: Arc<ErrorLogRepository>,
    pub property_config_repo: Arc<PropertyConfigRepository>,
    pub orchestrator: Arc<Orchestrator>,
    pub dispatcher: Arc<InboundDispatcher>,
    pub db_pool: DbPool,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(pool: DbPool, global: GlobalConfig) -> Result<Self, ErrorKind> {
        let property_config_repo = PropertyConfigRepository::new(pool.clone());
        let source = Arc::new(PropertyConfigRepoSource::new(PropertyConfigRepository::new(pool.clone())));
        let config = Arc::new(ConfigService::new(global, source));

        let message_log = Arc::new(MessageLogRepository::new(pool.clone()));
        let sync_status_repo = Arc::new(SyncStatusRepository::new(pool.clone()));
        let error_log_repo = Arc::new(ErrorLogRepository::new(pool.clone()));

        let transport = Arc::new(SoapTransport::new(TransportConfig::default())?);
        let circuit_breaker = Arc::new(CircuitBreaker::default());
        let retry_strategy: Arc<dyn RetryStrategy> = Arc::new(ExponentialBackoff::default());

        let orchestrator = Arc::new(Orchestrator::new(
            config.clone(),
            circuit_breaker,
            retry_strategy,
            transport,
            message_log.clone(),
            sync_status_repo.clone(),
            error_log_repo.clone(),
        ));

        // No handlers are registered by default — the gateway only ships
        // the protocol pipeline. A PMS host wires its own `InboundHandler`
        // impls onto this dispatcher at startup, e.g. `.with_handler(MessageType::Reservation, ...)`.
        let dispatcher = Arc::new(InboundDispatcher::new(config.clone(), message_log.clone()));

        Ok(Self {
            config,
            message_log,
            sync_status_repo,
            error_log_repo,
            property_config_repo: Arc::new(property_config_repo),
            orchestrator,
            dispatcher,
            db_pool: pool,
            started_at: chrono::Utc::now(),
        })
    }
}
