//! Observability: structured logging, Sentry error reporting, Prometheus
//! metrics.

use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sentry::ClientInitGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

#[derive(Clone, Debug)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: String,
    pub release: Option<String>,
    pub sample_rate: f32,
    pub enabled: bool,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: std::env::var("SENTRY_DSN").ok(),
            environment: std::env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()),
            release: Some(env!("CARGO_PKG_VERSION").to_string()),
            sample_rate: std::env::var("SENTRY_SAMPLE_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1.0),
            enabled: std::env::var("SENTRY_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        }
    }
}

fn init_sentry(config: &SentryConfig) -> Option<ClientInitGuard> {
    if !config.enabled {
        tracing::info!("Sentry error tracking disabled");
        return None;
    }

    let dsn = config.dsn.as_deref()?;
    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: config.release.clone().map(Into::into),
            environment: Some(config.environment.clone().into()),
            sample_rate: config.sample_rate,
            attach_stacktrace: true,
            send_default_pii: false,
            ..Default::default()
        },
    ));

    Some(guard)
}

fn init_metrics(config: &MetricsConfig) -> Option<PrometheusHandle> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    let handle = match PrometheusBuilder::new().install_recorder() {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("failed to install Prometheus recorder: {e}");
            return None;
        }
    };

    PROMETHEUS_HANDLE.set(handle.clone()).ok();

    metrics::describe_counter!("travelclick_outbound_attempts_total", "Outbound requests attempted, by message type");
    metrics::describe_counter!("travelclick_outbound_retries_total", "Outbound retries scheduled, by message type");
    metrics::describe_counter!("travelclick_circuit_trips_total", "Circuit breaker trips, by endpoint");
    metrics::describe_counter!("travelclick_inbound_requests_total", "Inbound SOAP requests received, by message type");

    Some(handle)
}

pub struct ObservabilityGuard {
    _sentry_guard: Option<ClientInitGuard>,
    _prometheus_handle: Option<PrometheusHandle>,
}

/// Sets up the global `tracing` subscriber plus Sentry/Prometheus, and
/// returns a guard that must stay alive for the process lifetime. Logs are
/// JSON-formatted unless `RUST_ENV=development`.
pub fn init_observability(sentry_config: SentryConfig, metrics_config: MetricsConfig) -> ObservabilityGuard {
    let prometheus_handle = init_metrics(&metrics_config);
    let sentry_guard = init_sentry(&sentry_config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gateway_server=debug,tower_http=debug".into());

    let is_development = std::env::var("RUST_ENV").unwrap_or_default() == "development";
    let registry = tracing_subscriber::registry();

    if is_development {
        let fmt_layer = tracing_subscriber::fmt::layer().with_filter(env_filter);
        if sentry_guard.is_some() {
            registry.with(fmt_layer).with(sentry::integrations::tracing::layer()).init();
        } else {
            registry.with(fmt_layer).init();
        }
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(env_filter);
        if sentry_guard.is_some() {
            registry.with(fmt_layer).with(sentry::integrations::tracing::layer()).init();
        } else {
            registry.with(fmt_layer).init();
        }
    }

    ObservabilityGuard {
        _sentry_guard: sentry_guard,
        _prometheus_handle: prometheus_handle,
    }
}

pub fn get_metrics_text() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# metrics not initialized\n".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentry_disabled_by_default_without_env() {
        let config = SentryConfig {
            dsn: None,
            environment: "test".to_string(),
            release: None,
            sample_rate: 1.0,
            enabled: false,
        };
        assert!(init_sentry(&config).is_none());
    }

    #[test]
    fn metrics_config_defaults_enabled() {
        assert!(MetricsConfig { enabled: true }.enabled);
    }
}
