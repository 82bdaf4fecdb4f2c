//! Inbound SOAP envelope decomposition. Tolerant of both SOAP 1.1 and SOAP 1.2 envelopes,
//! since this gateway only controls what it sends, not what the CRS sends.

use crate::namespace::{SOAP_1_1_NS, SOAP_1_2_NS};
use roxmltree::Document;
use travelclick_common::ErrorKind;
use travelclick_domain::MessageType;

/// Which SOAP version an inbound envelope declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoapVersion {
    V1_1,
    V1_2,
}

/// The WSSE `UsernameToken` credentials carried in the header, if present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsseToken {
    pub username: String,
    pub password: Option<String>,
    pub nonce: Option<String>,
    pub created: Option<String>,
}

/// A SOAP Fault found in the body, for inbound messages that are
/// themselves faults rather than notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFaultInfo {
    pub code: String,
    pub string: String,
}

/// The result of classifying and decomposing an inbound envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEnvelope {
    pub soap_version: SoapVersion,
    pub message_id: Option<String>,
    pub wsse: Option<WsseToken>,
    /// `wsa:From/ReferenceProperties/htn:HotelCode`, when the peer sends
    /// it; the inbound auth step falls back
    /// to an identifier embedded in the body when absent.
    pub hotel_code: Option<String>,
    pub message_type: MessageType,
    pub body_root_name: String,
    /// Raw bytes of the body's first child element, sliced from the
    /// original input — handed to the per-type domain parser unchanged.
    pub body_xml: Vec<u8>,
    pub fault: Option<SoapFaultInfo>,
}

fn malformed(message: impl Into<String>) -> ErrorKind {
    ErrorKind::SoapXml {
        fault_code: Some("Client".to_string()),
        message: message.into(),
        server_side: false,
    }
}

/// Parse an inbound SOAP envelope and classify its body's root element.
pub fn parse_envelope(xml: &[u8]) -> Result<ParsedEnvelope, ErrorKind> {
    let text = std::str::from_utf8(xml).map_err(|e| malformed(format!("envelope is not valid UTF-8: {e}")))?;
    let doc = Document::parse(text).map_err(|e| malformed(format!("envelope is not well-formed XML: {e}")))?;

    let envelope = doc.root_element();
    let soap_version = match envelope.tag_name().namespace() {
        Some(ns) if ns == SOAP_1_2_NS => SoapVersion::V1_2,
        Some(ns) if ns == SOAP_1_1_NS => SoapVersion::V1_1,
        _ => {
            return Err(malformed(format!(
                "root element {:?} is not a recognized SOAP envelope",
                envelope.tag_name().name()
            )))
        }
    };

    let header = envelope
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "Header");
    let (message_id, wsse, hotel_code) = header.map(parse_header).unwrap_or((None, None, None));

    let body = envelope
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "Body")
        .ok_or_else(|| malformed("envelope has no Body element"))?;

    let body_child = body
        .children()
        .find(|n| n.is_element())
        .ok_or_else(|| malformed("Body element is empty"))?;

    let fault = if body_child.tag_name().name() == "Fault" {
        Some(parse_fault(body_child))
    } else {
        None
    };

    let body_root_name = body_child.tag_name().name().to_string();
    let message_type = MessageType::from_body_root(&body_root_name);
    let range = body_child.range();
    let body_xml = text.as_bytes()[range].to_vec();

    Ok(ParsedEnvelope {
        soap_version,
        message_id,
        wsse,
        hotel_code,
        message_type,
        body_root_name,
        body_xml,
        fault,
    })
}

#[allow(clippy::type_complexity)]
fn parse_header(header: roxmltree::Node) -> (Option<String>, Option<WsseToken>, Option<String>) {
    let message_id = header
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "MessageID")
        .and_then(|n| n.text())
        .map(str::to_string);

    let username_token = header
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "UsernameToken");

    let wsse = username_token.map(|token| {
        let field = |name: &str| {
            token
                .descendants()
                .find(|n| n.is_element() && n.tag_name().name() == name)
                .and_then(|n| n.text())
                .map(str::to_string)
        };
        WsseToken {
            username: field("Username").unwrap_or_default(),
            password: field("Password"),
            nonce: field("Nonce"),
            created: field("Created"),
        }
    });

    let hotel_code = header
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "HotelCode")
        .and_then(|n| n.text())
        .map(str::to_string);

    (message_id, wsse, hotel_code)
}

fn parse_fault(fault_node: roxmltree::Node) -> SoapFaultInfo {
    let find_text = |names: &[&str]| -> Option<String> {
        fault_node
            .descendants()
            .find(|n| n.is_element() && names.contains(&n.tag_name().name()))
            .and_then(|n| n.text())
            .map(str::to_string)
    };
    SoapFaultInfo {
        code: find_text(&["faultcode", "Code"]).unwrap_or_default(),
        string: find_text(&["faultstring", "Reason"]).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOAP_1_2_SAMPLE: &str = r#"<?xml version="1.0"?>
<soap:Envelope xmlns:soap="http://www.w3.org/2003/05/soap-envelope"
               xmlns:wsa="http://www.w3.org/2005/08/addressing"
               xmlns:wsse="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd"
               xmlns:ota="http://www.opentravel.org/OTA/2003/05">
  <soap:Header>
    <wsa:MessageID>msg-123</wsa:MessageID>
    <wsa:From>
      <wsa:ReferenceProperties>
        <htn:HotelCode>HOTEL001</htn:HotelCode>
      </wsa:ReferenceProperties>
    </wsa:From>
    <wsse:Security>
      <wsse:UsernameToken>
        <wsse:Username>svc</wsse:Username>
        <wsse:Password>sekrit</wsse:Password>
      </wsse:UsernameToken>
    </wsse:Security>
  </soap:Header>
  <soap:Body>
    <ota:OTA_HotelResNotifRQ TimeStamp="2026-07-27T10:00:00" Version="4.000" ResStatus="Commit">
      <ota:HotelReservations/>
    </ota:OTA_HotelResNotifRQ>
  </soap:Body>
</soap:Envelope>"#;

    const SOAP_1_1_FAULT: &str = r#"<?xml version="1.0"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>soap:Client</faultcode>
      <faultstring>Authentication failed</faultstring>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;

    #[test]
    fn parses_soap_1_2_envelope_with_wsse_and_message_id() {
        let parsed = parse_envelope(SOAP_1_2_SAMPLE.as_bytes()).unwrap();
        assert_eq!(parsed.soap_version, SoapVersion::V1_2);
        assert_eq!(parsed.message_id.as_deref(), Some("msg-123"));
        assert_eq!(parsed.message_type, MessageType::Reservation);
        assert_eq!(parsed.hotel_code.as_deref(), Some("HOTEL001"));
        let wsse = parsed.wsse.unwrap();
        assert_eq!(wsse.username, "svc");
        assert_eq!(wsse.password.as_deref(), Some("sekrit"));
        assert!(parsed.fault.is_none());
    }

    #[test]
    fn parses_soap_1_1_fault() {
        let parsed = parse_envelope(SOAP_1_1_FAULT.as_bytes()).unwrap();
        assert_eq!(parsed.soap_version, SoapVersion::V1_1);
        let fault = parsed.fault.unwrap();
        assert!(fault.string.contains("Authentication"));
    }

    #[test]
    fn rejects_non_soap_root() {
        let err = parse_envelope(b"<NotSoap/>");
        assert!(err.is_err());
    }
}
