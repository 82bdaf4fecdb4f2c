//! Outbound job state machine: `NEW → VALIDATE → CIRCUIT_CHECK →
//! BUILD_HEADERS → SEND → PARSE_RESPONSE → UPDATE_LOG → (CHAIN|DONE)`.
//!
//! The job *queue* — scheduling, requeue-with-delay, worker concurrency —
//! is an external collaborator; this orchestrator only owns the transition logic for a single
//! attempt of a single job. A caller (an HTTP handler, a cron-driven retry
//! sweep) invokes [`Orchestrator::submit_*`] for a NEW job and
//! [`Orchestrator::retry`] to advance a RETRY_PENDING one.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use chrono::Utc;
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use travelclick_common::ErrorKind;
use travelclick_config::ConfigService;
use travelclick_db::repositories::{
    ErrorLogRepository, MessageLogRepository, SyncStatusRepository, UpdateError,
};
use travelclick_domain::{
    AuditEntry, Direction, GroupBlock, InventoryItem, MessageStatus, MessageType, RatePlan,
    Reservation, RestrictionItem, RoomStay,
};
use travelclick_messaging::{message_id, sync_status, CircuitBreaker, RetryStrategy};
use travelclick_transport::{SoapTransport, TransportErrorKind};
use travelclick_xml::builders::{group_block, inventory, rate, reservation, restriction, wrap_envelope};
use travelclick_xml::parsers::envelope::parse_envelope;
use travelclick_xml::parsers::response::parse_response;
use travelclick_xml::soap_header::{build_header, generate_nonce, SoapHeaderInputs, WsseCredentials, DEFAULT_ACTION};
use travelclick_xml::validate as validate_xml;

const INVENTORY_BATCH_MAX: usize = 100;
const RATES_BATCH_MAX: usize = 50;

/// Emitted on the `CHAIN` transition of the job FSM. Resolving the actual
/// counts to send back requires domain-side availability logic this
/// gateway doesn't own, so this event only carries what the reservation
/// told us, and a host-side consumer looks up current availability and
/// calls [`Orchestrator::submit`] with an `OutboundPayload::Inventory`
/// itself.
#[derive(Debug, Clone)]
pub enum ChainEvent {
    ReservationCompleted {
        property_id: Uuid,
        hotel_code: String,
        message_id: String,
        room_stays: Vec<RoomStay>,
    },
}

/// Everything this gateway can send outbound, one variant per builder.
pub enum OutboundPayload {
    Inventory(Vec<InventoryItem>),
    Rates(Vec<RatePlan>),
    Reservation(Box<Reservation>),
    Restrictions(Vec<RestrictionItem>),
    GroupBlock(Vec<GroupBlock>),
}

impl OutboundPayload {
    pub fn message_type(&self) -> MessageType {
        match self {
            OutboundPayload::Inventory(_) => MessageType::Inventory,
            OutboundPayload::Rates(_) => MessageType::Rates,
            OutboundPayload::Reservation(_) => MessageType::Reservation,
            OutboundPayload::Restrictions(_) => MessageType::Restrictions,
            OutboundPayload::GroupBlock(_) => MessageType::GroupBlock,
        }
    }
}

pub struct Orchestrator {
    config: Arc<ConfigService>,
    circuit_breaker: Arc<CircuitBreaker>,
    retry_strategy: Arc<dyn RetryStrategy>,
    transport: Arc<SoapTransport>,
    message_log: Arc<MessageLogRepository>,
    sync_status_repo: Arc<SyncStatusRepository>,
    error_log_repo: Arc<ErrorLogRepository>,
    /// Per `(property-id, message-type)` single-flight lock.
    locks: StdMutex<HashMap<(Uuid, MessageType), Arc<AsyncMutex<()>>>>,
    chain_tx: Option<tokio::sync::mpsc::UnboundedSender<ChainEvent>>,
}

impl Orchestrator {
    pub fn new(
        config: Arc<ConfigService>,
        circuit_breaker: Arc<CircuitBreaker>,
        retry_strategy: Arc<dyn RetryStrategy>,
        transport: Arc<SoapTransport>,
        message_log: Arc<MessageLogRepository>,
        sync_status_repo: Arc<SyncStatusRepository>,
        error_log_repo: Arc<ErrorLogRepository>,
    ) -> Self {
        Self {
            config,
            circuit_breaker,
            retry_strategy,
            transport,
            message_log,
            sync_status_repo,
            error_log_repo,
            locks: StdMutex::new(HashMap::new()),
            chain_tx: None,
        }
    }

    /// Opts this orchestrator into emitting [`ChainEvent`]s on the `CHAIN`
    /// transition, returning the receiver side for a host to drive its own
    /// follow-up job submission.
    pub fn with_chain_events(mut self) -> (Self, tokio::sync::mpsc::UnboundedReceiver<ChainEvent>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        self.chain_tx = Some(tx);
        (self, rx)
    }

    fn lock_for(&self, property_id: Uuid, message_type: MessageType) -> Arc<AsyncMutex<()>> {
        self.locks
            .lock()
            .expect("orchestrator lock map poisoned")
            .entry((property_id, message_type))
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Submit a batch, splitting it into sub-batches (inventory max 100,
    /// rates max 50) and preserving input order within the batch.
    /// Non-batchable message types submit as one job.
    pub async fn submit(
        &self,
        property_id: Uuid,
        payload: OutboundPayload,
        echo_token: Option<String>,
    ) -> Result<Vec<AuditEntry>, ErrorKind> {
        match payload {
            OutboundPayload::Inventory(items) => {
                self.submit_chunked(property_id, items, INVENTORY_BATCH_MAX, echo_token, |hotel_code, ts, token, chunk| {
                    inventory::build_body(hotel_code, ts, token, chunk)
                })
                .await
            }
            OutboundPayload::Rates(plans) => {
                // When the external system handles linked-rate expansion
                // itself, only the master plan is sent — drop every plan
                // the master side already derives.
                let plans = if self.config.get_global().external_system_handles_linked_rates {
                    plans.into_iter().filter(|p| p.linked_to.is_none()).collect()
                } else {
                    plans
                };
                self.submit_chunked(property_id, plans, RATES_BATCH_MAX, echo_token, |hotel_code, ts, token, chunk| {
                    let lookup = chunk.to_vec();
                    rate::build_body(hotel_code, ts, token, chunk, move |code| {
                        lookup.iter().find(|p| p.plan_code == code)
                    })
                })
                .await
            }
            OutboundPayload::Reservation(res) => {
                let entry = self
                    .submit_single(
                        property_id,
                        MessageType::Reservation,
                        None,
                        None,
                        echo_token.as_deref(),
                        |hotel_code, ts, token| reservation::build_body(hotel_code, ts, token, &res),
                    )
                    .await?;
                if entry.status == MessageStatus::Completed
                    && self.config.get_global().auto_send_inventory_updates
                {
                    if let Some(tx) = &self.chain_tx {
                        let _ = tx.send(ChainEvent::ReservationCompleted {
                            property_id,
                            hotel_code: entry.hotel_code.clone(),
                            message_id: entry.message_id.clone(),
                            room_stays: res.room_stays.clone(),
                        });
                    }
                }
                Ok(vec![entry])
            }
            OutboundPayload::Restrictions(items) => {
                self.submit_chunked(property_id, items, usize::MAX, echo_token, |_hotel_code, ts, token, chunk| {
                    restriction::build_body(ts, token, chunk)
                })
                .await
            }
            OutboundPayload::GroupBlock(blocks) => {
                self.submit_chunked(property_id, blocks, usize::MAX, echo_token, |_hotel_code, ts, token, chunk| {
                    group_block::build_body(ts, token, chunk)
                })
                .await
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn submit_chunked<T: Clone>(
        &self,
        property_id: Uuid,
        items: Vec<T>,
        max_per_batch: usize,
        echo_token: Option<String>,
        build: impl Fn(&str, chrono::DateTime<Utc>, Option<&str>, &[T]) -> Result<Vec<u8>, quick_xml::Error>,
    ) -> Result<Vec<AuditEntry>, ErrorKind>
    where
        T: HasMessageType,
    {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let message_type = T::MESSAGE_TYPE;
        let chunks: Vec<&[T]> = items.chunks(max_per_batch.max(1)).collect();
        let batch_id = if chunks.len() > 1 {
            Some(Uuid::new_v4().to_string())
        } else {
            None
        };

        let mut entries = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let chunk_owned = chunk.to_vec();
            let entry = self
                .submit_single(
                    property_id,
                    message_type,
                    batch_id.clone(),
                    None,
                    echo_token.as_deref(),
                    |hotel_code, ts, token| build(hotel_code, ts, token, &chunk_owned),
                )
                .await?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Run one job, start to finish, for one already-built logical unit of
    /// work (one sub-batch, or one reservation).
    #[allow(clippy::too_many_arguments)]
    async fn submit_single(
        &self,
        property_id: Uuid,
        message_type: MessageType,
        batch_id: Option<String>,
        parent_message_id: Option<String>,
        echo_token: Option<&str>,
        build_body: impl Fn(&str, chrono::DateTime<Utc>, Option<&str>) -> Result<Vec<u8>, quick_xml::Error>,
    ) -> Result<AuditEntry, ErrorKind> {
        let lock = self.lock_for(property_id, message_type);
        let _guard = lock.lock().await;

        let property = self
            .config
            .get(property_id)
            .await
            .map_err(|e| ErrorKind::from(e))?;

        if !property.active {
            return Err(ErrorKind::Configuration {
                message: format!("property {property_id} is not active"),
            });
        }
        if !property.enabled_message_types.is_empty() && !property.enabled_message_types.contains(&message_type) {
            return Err(ErrorKind::Configuration {
                message: format!("{message_type} is not enabled for property {property_id}"),
            });
        }

        let now = Utc::now();
        let body = build_body(&property.hotel_code, now, echo_token).map_err(|e| ErrorKind::SoapXml {
            fault_code: None,
            message: format!("failed to build {message_type} body: {e}"),
            server_side: false,
        })?;

        let message_id = message_id::generate_unique();

        // NEW
        let mut entry = self
            .message_log
            .create_pending(
                &message_id,
                Direction::Outbound,
                message_type,
                property_id,
                &property.hotel_code,
                &body,
                parent_message_id.as_deref(),
                batch_id.as_deref(),
            )
            .await
            .map_err(|e| ErrorKind::Configuration {
                message: format!("failed to persist pending audit entry: {e}"),
            })?;

        // VALIDATE
        let issues = validate_xml(&body, message_type);
        if !issues.is_empty() {
            let message = issues
                .first()
                .map(|i| i.message.clone())
                .unwrap_or_else(|| "schema validation failed".to_string());
            let kind = ErrorKind::Validation {
                message: message.clone(),
                violations: vec![],
                warnings: vec![],
            };
            entry = self.terminal_failure(entry, &kind, None).await?;
            return Ok(entry);
        }

        // CIRCUIT_CHECK
        if self.circuit_breaker.admit(&property.endpoint_url) == travelclick_messaging::circuit_breaker::Admission::Rejected {
            let kind = ErrorKind::Connection {
                message: format!("circuit open for endpoint {}", property.endpoint_url),
            };
            entry = self.circuit_deferred(entry, &kind, &property.endpoint_url).await?;
            return Ok(entry);
        }

        entry = self
            .message_log
            .mark_started(entry.id, entry.version)
            .await
            .map_err(|e| self.update_error_to_kind(e))?;

        // BUILD_HEADERS
        let credentials = WsseCredentials {
            username: property.username.clone(),
            password: property.password.clone(),
            nonce: generate_nonce(),
            created: now,
        };
        let header_inputs = SoapHeaderInputs::new(&message_id, &property.endpoint_url, &property.hotel_code, credentials);
        let header = build_header(&header_inputs).map_err(|e| ErrorKind::SoapXml {
            fault_code: None,
            message: format!("failed to build SOAP header: {e}"),
            server_side: false,
        })?;
        let envelope = wrap_envelope(&header, &body).map_err(|e| ErrorKind::SoapXml {
            fault_code: None,
            message: format!("failed to wrap SOAP envelope: {e}"),
            server_side: false,
        })?;

        // SEND
        let send_result = self.transport.send(&property.endpoint_url, DEFAULT_ACTION, envelope).await;
        let response = match send_result {
            Ok(response) => {
                self.circuit_breaker.record_success(&property.endpoint_url);
                response
            }
            Err(transport_err) => {
                self.circuit_breaker.record_failure(&property.endpoint_url);
                let kind = transport_err.into_error_kind();
                entry = self.classify_and_fail(entry, &kind).await?;
                return Ok(entry);
            }
        };

        // PARSE_RESPONSE
        let parsed_envelope = match parse_envelope(&response.raw_body) {
            Ok(parsed) => parsed,
            Err(kind) => {
                entry = self.classify_and_fail(entry, &kind).await?;
                return Ok(entry);
            }
        };

        if let Some(fault) = parsed_envelope.fault {
            let kind = TransportErrorKind::SoapFault {
                code: fault.code,
                string: fault.string,
            }
            .into_error_kind();
            entry = self.classify_and_fail(entry, &kind).await?;
            return Ok(entry);
        }

        let parsed = match parse_response(&parsed_envelope.body_xml) {
            Ok(parsed) => parsed,
            Err(kind) => {
                entry = self.classify_and_fail(entry, &kind).await?;
                return Ok(entry);
            }
        };

        let duration_ms = (Utc::now() - now).num_milliseconds().max(0);

        if parsed.success {
            entry = self
                .message_log
                .mark_completed(entry.id, entry.version, &response.raw_body, duration_ms)
                .await
                .map_err(|e| self.update_error_to_kind(e))?;
            self.apply_sync_status(property_id, message_type, false).await?;
        } else {
            let message = parsed
                .errors
                .first()
                .map(|e| e.short_text.clone())
                .unwrap_or_else(|| "CRS reported an unsuccessful response".to_string());
            let kind = ErrorKind::BusinessLogic { message };
            entry = self.business_logic_failure(entry, &kind, Some(&response.raw_body)).await?;
        }

        Ok(entry)
    }

    /// Resume a RETRY_PENDING job for another attempt. Re-runs the same
    /// build/validate/send/parse pipeline against the persisted request
    /// body, since that body was already validated and is immutable once
    /// logged.
    pub async fn retry(&self, id: Uuid) -> Result<AuditEntry, ErrorKind> {
        let mut entry = self
            .message_log
            .get(id)
            .await
            .map_err(|e| ErrorKind::Configuration {
                message: format!("failed to load audit entry {id}: {e}"),
            })?
            .ok_or_else(|| ErrorKind::Configuration {
                message: format!("audit entry {id} not found"),
            })?;

        if entry.status != MessageStatus::RetryPending {
            return Err(ErrorKind::BusinessLogic {
                message: format!("audit entry {id} is not RETRY_PENDING"),
            });
        }

        let property = self.config.get(entry.property_id).await.map_err(ErrorKind::from)?;
        let lock = self.lock_for(entry.property_id, entry.message_type);
        let _guard = lock.lock().await;

        if self.circuit_breaker.admit(&property.endpoint_url) == travelclick_messaging::circuit_breaker::Admission::Rejected {
            return Ok(entry);
        }

        entry = self
            .message_log
            .mark_started(entry.id, entry.version)
            .await
            .map_err(|e| self.update_error_to_kind(e))?;

        let body = entry.request_xml.clone().ok_or_else(|| ErrorKind::Configuration {
            message: format!("audit entry {id} has no stored request body to retry"),
        })?;
        let message_id = entry.message_id.clone();
        let now = Utc::now();
        let credentials = WsseCredentials {
            username: property.username.clone(),
            password: property.password.clone(),
            nonce: generate_nonce(),
            created: now,
        };
        let header_inputs = SoapHeaderInputs::new(&message_id, &property.endpoint_url, &property.hotel_code, credentials);
        let header = build_header(&header_inputs).map_err(|e| ErrorKind::SoapXml {
            fault_code: None,
            message: format!("failed to build SOAP header: {e}"),
            server_side: false,
        })?;
        let envelope = wrap_envelope(&header, &body).map_err(|e| ErrorKind::SoapXml {
            fault_code: None,
            message: format!("failed to wrap SOAP envelope: {e}"),
            server_side: false,
        })?;

        match self.transport.send(&property.endpoint_url, DEFAULT_ACTION, envelope).await {
            Ok(response) => {
                self.circuit_breaker.record_success(&property.endpoint_url);
                let duration_ms = (Utc::now() - now).num_milliseconds().max(0);
                entry = self
                    .message_log
                    .mark_completed(entry.id, entry.version, &response.raw_body, duration_ms)
                    .await
                    .map_err(|e| self.update_error_to_kind(e))?;
                self.apply_sync_status(entry.property_id, entry.message_type, false).await?;
                Ok(entry)
            }
            Err(transport_err) => {
                self.circuit_breaker.record_failure(&property.endpoint_url);
                let kind = transport_err.into_error_kind();
                self.classify_and_fail(entry, &kind).await
            }
        }
    }

    async fn classify_and_fail(&self, entry: AuditEntry, kind: &ErrorKind) -> Result<AuditEntry, ErrorKind> {
        let attempt = entry.retry_count + 1;
        if kind.is_retryable() && attempt < self.retry_strategy.max_attempts() {
            self.retryable_failure(entry, kind).await
        } else {
            self.terminal_failure(entry, kind, None).await
        }
    }

    /// Circuit-open rejection: the job never reached the network, so it is
    /// requeued as RETRY_PENDING without consuming retry budget. The
    /// requeue delay is the circuit's own remaining reset time rather than
    /// the retry strategy's backoff schedule, since there's no point
    /// retrying before the breaker would admit the call anyway.
    async fn circuit_deferred(&self, entry: AuditEntry, kind: &ErrorKind, endpoint: &str) -> Result<AuditEntry, ErrorKind> {
        let delay = self.circuit_breaker.remaining_reset(endpoint).unwrap_or_else(chrono::Duration::zero);
        tracing::warn!(endpoint, delay_ms = delay.num_milliseconds(), "circuit open, deferring job without consuming retry budget");
        let entry = self
            .message_log
            .mark_retry_pending(entry.id, entry.version, kind.short_code(), &kind.to_string())
            .await
            .map_err(|e| self.update_error_to_kind(e))?;
        self.log_error(&entry, kind, true).await?;
        self.apply_sync_status(entry.property_id, entry.message_type, true).await?;
        Ok(entry)
    }

    /// A business-logic rejection from the CRS lands in the distinct FAILED
    /// status, never FAILED_PERMANENT (which is reserved for retry/transport
    /// exhaustion).
    async fn business_logic_failure(
        &self,
        entry: AuditEntry,
        kind: &ErrorKind,
        response_xml: Option<&[u8]>,
    ) -> Result<AuditEntry, ErrorKind> {
        let entry = self
            .message_log
            .mark_business_failed(entry.id, entry.version, kind.short_code(), &kind.to_string(), response_xml)
            .await
            .map_err(|e| self.update_error_to_kind(e))?;
        self.log_error(&entry, kind, false).await?;
        self.apply_sync_status(entry.property_id, entry.message_type, true).await?;
        Ok(entry)
    }

    async fn retryable_failure(&self, entry: AuditEntry, kind: &ErrorKind) -> Result<AuditEntry, ErrorKind> {
        let entry = self
            .message_log
            .mark_failed(entry.id, entry.version, kind.short_code(), &kind.to_string(), None, false)
            .await
            .map_err(|e| self.update_error_to_kind(e))?;
        let entry = self
            .message_log
            .increment_retry(entry.id, entry.version)
            .await
            .map_err(|e| self.update_error_to_kind(e))?;
        self.log_error(&entry, kind, true).await?;
        self.apply_sync_status(entry.property_id, entry.message_type, true).await?;
        Ok(entry)
    }

    async fn terminal_failure(
        &self,
        entry: AuditEntry,
        kind: &ErrorKind,
        response_xml: Option<&[u8]>,
    ) -> Result<AuditEntry, ErrorKind> {
        let entry = self
            .message_log
            .mark_failed(entry.id, entry.version, kind.short_code(), &kind.to_string(), response_xml, true)
            .await
            .map_err(|e| self.update_error_to_kind(e))?;
        self.log_error(&entry, kind, false).await?;
        self.apply_sync_status(entry.property_id, entry.message_type, true).await?;
        Ok(entry)
    }

    async fn log_error(&self, entry: &AuditEntry, kind: &ErrorKind, can_retry: bool) -> Result<(), ErrorKind> {
        let context = serde_json::json!({
            "hotel_code": entry.hotel_code,
            "message_id": entry.message_id,
            "attempt": entry.retry_count,
        });
        self.error_log_repo
            .insert(entry.id, kind.short_code(), kind.severity(), kind.short_code(), &kind.to_string(), context, can_retry)
            .await
            .map_err(|e| ErrorKind::Configuration {
                message: format!("failed to persist error log entry: {e}"),
            })?;
        Ok(())
    }

    async fn apply_sync_status(&self, property_id: Uuid, message_type: MessageType, failed: bool) -> Result<(), ErrorKind> {
        let mut status = self
            .sync_status_repo
            .get(property_id, message_type)
            .await
            .map_err(|e| ErrorKind::Configuration {
                message: format!("failed to load sync status: {e}"),
            })?
            .unwrap_or_else(|| travelclick_domain::SyncStatus {
                property_id,
                message_type,
                status: travelclick_domain::SyncStatusValue::Idle,
                last_attempt: None,
                last_success: None,
                success_rate: 100.0,
                records_total: 0,
                records_processed: 0,
                retry_count: 0,
                auto_retry_enabled: true,
                next_retry_at: None,
                max_retries: self.retry_strategy.max_attempts(),
                health_score: 100,
            });

        sync_status::apply_transition(&mut status, failed, Utc::now());
        status.records_total += 1;
        if !failed {
            status.records_processed += 1;
        }
        status.success_rate = if status.records_total > 0 {
            (status.records_processed as f64 / status.records_total as f64) * 100.0
        } else {
            100.0
        };
        status.status = if failed {
            if status.health_score < 50 {
                travelclick_domain::SyncStatusValue::Failing
            } else {
                travelclick_domain::SyncStatusValue::Degraded
            }
        } else {
            travelclick_domain::SyncStatusValue::Healthy
        };

        self.sync_status_repo
            .upsert(&status)
            .await
            .map_err(|e| ErrorKind::Configuration {
                message: format!("failed to persist sync status: {e}"),
            })
    }

    fn update_error_to_kind(&self, err: UpdateError) -> ErrorKind {
        match err {
            UpdateError::Sql(e) => ErrorKind::Configuration {
                message: format!("database error: {e}"),
            },
            UpdateError::VersionConflict { id } => ErrorKind::Connection {
                message: format!("version conflict updating audit entry {id}, concurrent writer won"),
            },
            UpdateError::NotFound { id } => ErrorKind::Configuration {
                message: format!("audit entry {id} not found"),
            },
        }
    }
}

/// Maps a payload item type to the [`MessageType`] its batch is logged
/// under, so [`Orchestrator::submit_chunked`] stays generic over the five
/// batchable item types.
trait HasMessageType {
    const MESSAGE_TYPE: MessageType;
}

impl HasMessageType for InventoryItem {
    const MESSAGE_TYPE: MessageType = MessageType::Inventory;
}
impl HasMessageType for RatePlan {
    const MESSAGE_TYPE: MessageType = MessageType::Rates;
}
impl HasMessageType for RestrictionItem {
    const MESSAGE_TYPE: MessageType = MessageType::Restrictions;
}
impl HasMessageType for GroupBlock {
    const MESSAGE_TYPE: MessageType = MessageType::GroupBlock;
}
