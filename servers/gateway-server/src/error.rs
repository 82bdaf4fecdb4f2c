//! `GatewayError`: composes the per-crate error enums into one type that
//! implements `axum::response::IntoResponse` for the JSON management
//! surface. The SOAP endpoint itself
//! never returns this type — it always responds 200/4xx/5xx with a SOAP
//! envelope body, synthesized by [`crate::services::dispatcher`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use travelclick_common::ErrorKind;
use travelclick_config::service::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Classified(#[from] ErrorKind),
    #[error("not found")]
    NotFound,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            GatewayError::Config(ConfigError::PropertyNotFound(_)) => (StatusCode::NOT_FOUND, "PROPERTY_NOT_FOUND"),
            GatewayError::Config(ConfigError::EnvironmentMismatch { .. }) => {
                (StatusCode::CONFLICT, "ENVIRONMENT_MISMATCH")
            }
            GatewayError::Config(_) => (StatusCode::BAD_REQUEST, "INVALID_CONFIG"),
            GatewayError::Classified(kind) => (status_for_kind(kind), kind.short_code()),
            GatewayError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        };

        let body = Json(json!({
            "error": code,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

fn status_for_kind(kind: &ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Authentication { .. } => StatusCode::UNAUTHORIZED,
        ErrorKind::Validation { .. } | ErrorKind::BusinessLogic { .. } | ErrorKind::DataMapping { .. } => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::RateLimit { .. } => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    }
}
