//! Shared error taxonomy and small value types used across the gateway crates.

pub mod error;

pub use error::{ErrorCategory, ErrorKind, FieldViolation};
