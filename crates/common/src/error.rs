//! Cross-cutting error taxonomy.
//!
//! Every failure surfaced anywhere in the gateway — transport, XML, business
//! rules, configuration — is classified into one of these kinds so the retry
//! engine, the audit log, and the inbound fault synthesizer can all reason
//! about it the same way.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field-level validation complaint.
///
/// Carries both a structured-fields shape (invalid fields plus the rules
/// they broke) and a free-context shape (a message plus warnings) as
/// optional fields on one [`ErrorKind::Validation`] variant, so callers that
/// only have a message aren't forced to populate the rest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub rule: String,
    pub value: Option<String>,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// The ten error categories, used for reporting and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Connection,
    Authentication,
    Validation,
    SoapXml,
    BusinessLogic,
    RateLimit,
    Timeout,
    Configuration,
    DataMapping,
    Unknown,
}

impl ErrorCategory {
    /// Severity 1 (critical) .. 4 (low).
    pub fn severity(self) -> u8 {
        match self {
            ErrorCategory::Authentication | ErrorCategory::Configuration => 1,
            ErrorCategory::Connection
            | ErrorCategory::SoapXml
            | ErrorCategory::BusinessLogic
            | ErrorCategory::Timeout
            | ErrorCategory::Unknown => 2,
            ErrorCategory::Validation | ErrorCategory::RateLimit | ErrorCategory::DataMapping => 3,
        }
    }
}

/// A classified failure, carrying enough context for the retry engine, the
/// audit log, and inbound SOAP fault synthesis to each do their job without
/// re-deriving the category from a string message.
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Reach failures: DNS, TCP connect refused, TLS handshake reset.
    #[error("connection error: {message}")]
    Connection { message: String },

    /// WSSE rejection or HTTP 401. `service_unavailable` is set when the
    /// faultstring indicates a transient condition ("service unavailable",
    /// "temporary") — the only case this category is retryable.
    #[error("authentication error: {message}")]
    Authentication {
        message: String,
        service_unavailable: bool,
    },

    /// Schema, well-formedness, or field rule violation.
    #[error("validation error: {message}")]
    Validation {
        message: String,
        violations: Vec<FieldViolation>,
        warnings: Vec<String>,
    },

    /// Unparseable SOAP response or a server-originated SOAP fault.
    /// `server_side` marks faults attributable to the peer's 5xx-class
    /// failures, which are retryable; client-side faults are not.
    #[error("SOAP/XML error: {message}")]
    SoapXml {
        fault_code: Option<String>,
        message: String,
        server_side: bool,
    },

    /// Count/rate/reservation rule violation surfaced by a business
    /// validator or by the peer's response parser.
    #[error("business logic error: {message}")]
    BusinessLogic { message: String },

    /// HTTP 429 or a fault code indicating quota exhaustion.
    #[error("rate limited, retry after {retry_after_secs:?}s")]
    RateLimit {
        retry_after_secs: Option<u64>,
        message: String,
    },

    /// Connect or read timeout.
    #[error("timeout: {message}")]
    Timeout { message: String },

    /// Missing or invalid configuration.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Cross-system mapping failure (e.g. an unmapped room type code).
    #[error("data mapping error: {message}")]
    DataMapping { message: String },

    /// Anything that doesn't fit the above.
    #[error("unknown error: {message}")]
    Unknown { message: String },
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::Connection { .. } => ErrorCategory::Connection,
            ErrorKind::Authentication { .. } => ErrorCategory::Authentication,
            ErrorKind::Validation { .. } => ErrorCategory::Validation,
            ErrorKind::SoapXml { .. } => ErrorCategory::SoapXml,
            ErrorKind::BusinessLogic { .. } => ErrorCategory::BusinessLogic,
            ErrorKind::RateLimit { .. } => ErrorCategory::RateLimit,
            ErrorKind::Timeout { .. } => ErrorCategory::Timeout,
            ErrorKind::Configuration { .. } => ErrorCategory::Configuration,
            ErrorKind::DataMapping { .. } => ErrorCategory::DataMapping,
            ErrorKind::Unknown { .. } => ErrorCategory::Unknown,
        }
    }

    pub fn severity(&self) -> u8 {
        self.category().severity()
    }

    /// Whether the retry engine may attempt this message again.
    ///
    /// Connection, SOAP_XML (server-side only), rate-limit, and timeout are
    /// retryable; authentication is retryable only in its
    /// service-unavailable variant; everything else is not. Unknown is
    /// retryable once — the orchestrator enforces the "once" part via
    /// `max_attempts`, not here.
    pub fn is_retryable(&self) -> bool {
        match self {
            ErrorKind::Connection { .. }
            | ErrorKind::RateLimit { .. }
            | ErrorKind::Timeout { .. }
            | ErrorKind::Unknown { .. } => true,
            ErrorKind::SoapXml { server_side, .. } => *server_side,
            ErrorKind::Authentication {
                service_unavailable,
                ..
            } => *service_unavailable,
            ErrorKind::Validation { .. }
            | ErrorKind::BusinessLogic { .. }
            | ErrorKind::Configuration { .. }
            | ErrorKind::DataMapping { .. } => false,
        }
    }

    /// Minimum delay (seconds) the orchestrator must wait before the next
    /// attempt, independent of whatever the retry strategy computes — a
    /// floor, not the actual delay.
    pub fn minimum_delay_seconds(&self) -> u64 {
        match self {
            ErrorKind::Connection { .. } => 30,
            ErrorKind::Authentication { .. } => 60,
            ErrorKind::RateLimit { .. } => 0, // caller uses initial*multiplier via retry engine
            ErrorKind::Timeout { .. } => 0,   // caller uses the strategy's initial delay
            _ => 0,
        }
    }

    pub fn short_code(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Connection => "CONNECTION",
            ErrorCategory::Authentication => "AUTHENTICATION",
            ErrorCategory::Validation => "VALIDATION",
            ErrorCategory::SoapXml => "SOAP_XML",
            ErrorCategory::BusinessLogic => "BUSINESS_LOGIC",
            ErrorCategory::RateLimit => "RATE_LIMIT",
            ErrorCategory::Timeout => "TIMEOUT",
            ErrorCategory::Configuration => "CONFIGURATION",
            ErrorCategory::DataMapping => "DATA_MAPPING",
            ErrorCategory::Unknown => "UNKNOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_is_non_retryable_unless_service_unavailable() {
        let rejected = ErrorKind::Authentication {
            message: "bad password".into(),
            service_unavailable: false,
        };
        assert!(!rejected.is_retryable());

        let transient = ErrorKind::Authentication {
            message: "service unavailable, try later".into(),
            service_unavailable: true,
        };
        assert!(transient.is_retryable());
    }

    #[test]
    fn soap_xml_retryable_only_server_side() {
        let server = ErrorKind::SoapXml {
            fault_code: Some("Server".into()),
            message: "internal error".into(),
            server_side: true,
        };
        assert!(server.is_retryable());

        let client = ErrorKind::SoapXml {
            fault_code: Some("Client".into()),
            message: "bad request".into(),
            server_side: false,
        };
        assert!(!client.is_retryable());
    }

    #[test]
    fn severities_follow_the_taxonomy() {
        assert_eq!(ErrorCategory::Authentication.severity(), 1);
        assert_eq!(ErrorCategory::Configuration.severity(), 1);
        assert_eq!(ErrorCategory::Connection.severity(), 2);
        assert_eq!(ErrorCategory::Validation.severity(), 3);
        assert_eq!(ErrorCategory::RateLimit.severity(), 3);
        assert_eq!(ErrorCategory::DataMapping.severity(), 3);
    }
}
