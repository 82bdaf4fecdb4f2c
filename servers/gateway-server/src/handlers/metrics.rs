//! `GET /metrics`: render whatever the process-global Prometheus recorder
//! has collected, or a placeholder line if metrics were never enabled.

use axum::http::header;
use axum::response::IntoResponse;

use crate::observability;

pub async fn serve() -> impl IntoResponse {
    let body = observability::get_metrics_text();
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")], body)
}
