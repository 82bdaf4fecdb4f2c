//! axum handlers for the gateway's HTTP surface.

pub mod health;
pub mod metrics;
pub mod soap;
pub mod wsdl;
