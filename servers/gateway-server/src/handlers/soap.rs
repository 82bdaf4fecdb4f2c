//! `POST /api/travelclick/soap`: the single inbound endpoint for
//! every HTNG message type. The body is handed to the
//! [`crate::services::dispatcher::InboundDispatcher`] pipeline unparsed;
//! the response is always a SOAP envelope, never a JSON error body, since a
//! SOAP peer cannot be expected to understand anything else.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;

use crate::state::AppState;

pub async fn submit(State(state): State<AppState>, body: axum::body::Bytes) -> impl IntoResponse {
    let response = state.dispatcher.dispatch(&body).await;

    let status = StatusCode::from_u16(response.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, [(header::CONTENT_TYPE, "text/xml; charset=utf-8")], response.envelope)
}
