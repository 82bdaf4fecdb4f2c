//! Router assembly: a flat `Router::new().route(...)` style rather than
//! per-domain `nest()` modules — this gateway has exactly three routes
//! plus metrics.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, metrics, soap, wsdl};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/travelclick/soap", post(soap::submit))
        .route("/api/travelclick/soap/wsdl", get(wsdl::serve))
        .route("/api/travelclick/health", get(health::health))
        .route("/metrics", get(metrics::serve))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
