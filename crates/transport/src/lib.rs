//! SOAP transport: WSSE-signed HTTPS POST, trace capture, low-level error
//! classification. A single `send` entry point, a config struct carrying
//! timeouts, and classification of the transport error into a closed set
//! the caller switches on. This transport never retries and never
//! inspects business faults — that is the retry engine's and the
//! orchestrator's job.

use std::time::Duration;
use travelclick_common::ErrorKind;

/// Low-level transport outcome categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportErrorKind {
    ConnectTimeout,
    ReadTimeout,
    TlsError(String),
    DnsFailure(String),
    HttpStatus(u16),
    SoapFault { code: String, string: String },
    MalformedResponse(String),
}

impl TransportErrorKind {
    /// Escalate to Authentication when a SoapFault's code or faultstring
    /// indicates an auth failure; otherwise map by category
    ///.
    pub fn into_error_kind(self) -> ErrorKind {
        match self {
            TransportErrorKind::ConnectTimeout | TransportErrorKind::ReadTimeout => ErrorKind::Timeout {
                message: "transport timed out".to_string(),
            },
            TransportErrorKind::TlsError(message) | TransportErrorKind::DnsFailure(message) => {
                ErrorKind::Connection { message }
            }
            TransportErrorKind::HttpStatus(code) => ErrorKind::Connection {
                message: format!("unexpected HTTP status {code}"),
            },
            TransportErrorKind::SoapFault { code, string } => {
                let is_auth = code.ends_with("AUTHENTICATION_FAILED")
                    || string.to_lowercase().contains("unauthorized")
                    || string.to_lowercase().contains("authentication");
                if is_auth {
                    let service_unavailable = string.to_lowercase().contains("service unavailable")
                        || string.to_lowercase().contains("temporary");
                    ErrorKind::Authentication {
                        message: string,
                        service_unavailable,
                    }
                } else {
                    ErrorKind::SoapXml {
                        fault_code: Some(code),
                        message: string,
                        server_side: true,
                    }
                }
            }
            TransportErrorKind::MalformedResponse(message) => ErrorKind::SoapXml {
                fault_code: None,
                message,
                server_side: true,
            },
        }
    }
}

/// Timeouts and TLS posture for one transport instance.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub verify_peer: bool,
    pub verify_hostname: bool,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(45),
            verify_peer: true,
            verify_hostname: true,
            user_agent: "travelclick-gateway/0.1".to_string(),
        }
    }
}

/// Raw request/response bytes kept for the `AuditEntry` trace.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub raw_body: Vec<u8>,
}

/// Synchronous (from the caller's perspective) HTTPS POST transport.
/// Contract: `send(request) -> response | error-kind`.
pub struct SoapTransport {
    client: reqwest::Client,
    config: TransportConfig,
}

impl SoapTransport {
    pub fn new(config: TransportConfig) -> Result<Self, ErrorKind> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(!config.verify_peer)
            .danger_accept_invalid_hostnames(!config.verify_hostname)
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .build()
            .map_err(|e| ErrorKind::Configuration {
                message: format!("failed to build transport client: {e}"),
            })?;
        Ok(Self { client, config })
    }

    /// Send a raw SOAP envelope. Does not retry and does not inspect the
    /// response body for a business-level `soap:Fault` — the caller passes
    /// the raw bytes to `travelclick_xml::parsers::envelope::parse_envelope`
    /// for that.
    pub async fn send(&self, endpoint: &str, soap_action: &str, envelope: Vec<u8>) -> Result<TransportResponse, TransportErrorKind> {
        let result = self
            .client
            .post(endpoint)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", soap_action)
            .body(envelope)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => return Err(classify_request_error(&e)),
        };

        let status = response.status().as_u16();
        let raw_body = response
            .bytes()
            .await
            .map_err(|e| TransportErrorKind::MalformedResponse(e.to_string()))?
            .to_vec();

        if !(200..300).contains(&status) {
            return Err(TransportErrorKind::HttpStatus(status));
        }

        Ok(TransportResponse { status, raw_body })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

fn classify_request_error(err: &reqwest::Error) -> TransportErrorKind {
    if err.is_timeout() {
        if err.is_connect() {
            TransportErrorKind::ConnectTimeout
        } else {
            TransportErrorKind::ReadTimeout
        }
    } else if err.is_connect() {
        TransportErrorKind::DnsFailure(err.to_string())
    } else if let Some(source) = err.source_is_tls() {
        TransportErrorKind::TlsError(source)
    } else {
        TransportErrorKind::MalformedResponse(err.to_string())
    }
}

trait ReqwestErrorExt {
    fn source_is_tls(&self) -> Option<String>;
}

impl ReqwestErrorExt for reqwest::Error {
    fn source_is_tls(&self) -> Option<String> {
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            let text = err.to_string();
            if text.to_lowercase().contains("tls") || text.to_lowercase().contains("certificate") {
                return Some(text);
            }
            source = err.source();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soap_fault_with_authentication_code_escalates() {
        let kind = TransportErrorKind::SoapFault {
            code: "soap:Client.AUTHENTICATION_FAILED".to_string(),
            string: "Invalid credentials".to_string(),
        }
        .into_error_kind();
        assert!(matches!(kind, ErrorKind::Authentication { .. }));
    }

    #[test]
    fn soap_fault_with_temporary_text_is_retryable_authentication() {
        let kind = TransportErrorKind::SoapFault {
            code: "soap:Server".to_string(),
            string: "Authentication service temporary unavailable".to_string(),
        }
        .into_error_kind();
        match kind {
            ErrorKind::Authentication { service_unavailable, .. } => assert!(service_unavailable),
            other => panic!("expected Authentication, got {other:?}"),
        }
    }

    #[test]
    fn plain_soap_fault_maps_to_soap_xml() {
        let kind = TransportErrorKind::SoapFault {
            code: "soap:Server".to_string(),
            string: "Internal error".to_string(),
        }
        .into_error_kind();
        assert!(matches!(kind, ErrorKind::SoapXml { .. }));
    }

    #[test]
    fn connect_timeout_maps_to_timeout_kind() {
        assert!(matches!(TransportErrorKind::ConnectTimeout.into_error_kind(), ErrorKind::Timeout { .. }));
    }
}
