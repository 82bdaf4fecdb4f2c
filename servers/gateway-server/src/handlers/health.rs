//! `GET /api/travelclick/health`: a `DependencyHealth` check against the
//! database pool, rolled up into an overall status.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct DependencyHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub service: String,
    pub dependencies: Vec<DependencyHealth>,
    pub timestamp: String,
}

async fn check_database(pool: &travelclick_db::DbPool) -> DependencyHealth {
    let start = Instant::now();
    let result = sqlx::query("SELECT 1").fetch_one(pool).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => DependencyHealth {
            name: "database".to_string(),
            status: if latency_ms > 1000 {
                HealthStatus::Degraded
            } else {
                HealthStatus::Healthy
            },
            latency_ms: Some(latency_ms),
            error: None,
        },
        Err(e) => DependencyHealth {
            name: "database".to_string(),
            status: HealthStatus::Unhealthy,
            latency_ms: Some(latency_ms),
            error: Some(e.to_string()),
        },
    }
}

fn overall_status(dependencies: &[DependencyHealth]) -> HealthStatus {
    if dependencies.iter().any(|d| d.status == HealthStatus::Unhealthy) {
        HealthStatus::Unhealthy
    } else if dependencies.iter().any(|d| d.status == HealthStatus::Degraded) {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let dependencies = vec![check_database(&state.db_pool).await];
    let status = overall_status(&dependencies);

    let http_status = match status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: "travelclick-gateway".to_string(),
        dependencies,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    (http_status, Json(body))
}
