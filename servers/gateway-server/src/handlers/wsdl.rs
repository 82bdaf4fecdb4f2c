//! `GET /api/travelclick/soap/wsdl`: serves the HTNG2011B WSDL,
//! `Content-Type: text/xml`, with the service address pointed at whichever
//! endpoint this gateway's global config resolves for `Environment::Production`.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use travelclick_domain::Environment;

use crate::state::AppState;

pub async fn serve(State(state): State<AppState>) -> impl IntoResponse {
    let endpoint = state.config.get_endpoint(Environment::Production).to_string();
    let document = travelclick_xml::wsdl::render(&endpoint);

    ([(header::CONTENT_TYPE, "text/xml; charset=utf-8")], document)
}
