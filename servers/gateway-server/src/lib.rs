//! Binary crate hosting the TravelClick HTNG gateway's HTTP surface: the
//! outbound job orchestrator and inbound SOAP dispatcher from
//! `travelclick-*` wired onto `axum` routes.

pub mod error;
pub mod handlers;
pub mod observability;
pub mod routes;
pub mod services;
pub mod state;
