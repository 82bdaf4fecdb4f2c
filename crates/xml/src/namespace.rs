//! Namespace & schema registry.

use travelclick_domain::MessageType;

/// `(prefix, uri)` pairs used across every SOAP envelope this gateway
/// builds or parses.
pub const PREFIX_MAPPING: &[(&str, &str)] = &[
    ("soap", "http://www.w3.org/2003/05/soap-envelope"),
    ("soap11", "http://schemas.xmlsoap.org/soap/envelope/"),
    ("wsa", "http://www.w3.org/2005/08/addressing"),
    (
        "wsse",
        "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd",
    ),
    (
        "wsu",
        "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd",
    ),
    ("ota", "http://www.opentravel.org/OTA/2003/05"),
    ("htn", "http://www.htng.org/2011B/Header/"),
    ("xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    ("xsd", "http://www.w3.org/2001/XMLSchema"),
];

/// SOAP 1.2 envelope namespace, used for every outbound envelope.
pub const SOAP_1_2_NS: &str = "http://www.w3.org/2003/05/soap-envelope";
/// SOAP 1.1 envelope namespace, accepted on inbound only.
pub const SOAP_1_1_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Resolve a namespace URI for a known prefix. Returns `None` for anything
/// outside [`PREFIX_MAPPING`] — callers must not guess.
pub fn get_namespace_by_prefix(prefix: &str) -> Option<&'static str> {
    PREFIX_MAPPING
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, uri)| *uri)
}

/// Reverse lookup: the registered prefix for a namespace URI, if any.
pub fn get_prefix_by_namespace(uri: &str) -> Option<&'static str> {
    PREFIX_MAPPING
        .iter()
        .find(|(_, u)| *u == uri)
        .map(|(p, _)| *p)
}

/// The `Version` attribute HTNG 2011B expects on the outbound root element
/// for each message type. A single workspace-wide constant since this
/// gateway implements one HTNG version.
pub fn schema_version_for(message_type: MessageType) -> &'static str {
    match message_type {
        MessageType::Inventory => "4.000",
        MessageType::Rates => "4.000",
        MessageType::Reservation => "4.000",
        MessageType::Restrictions => "4.000",
        MessageType::GroupBlock => "4.000",
        MessageType::Response | MessageType::Unknown => "4.000",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_lookup_matches_table() {
        for (prefix, uri) in PREFIX_MAPPING {
            assert_eq!(get_namespace_by_prefix(prefix), Some(*uri));
        }
        assert_eq!(get_namespace_by_prefix("nonexistent"), None);
    }

    #[test]
    fn reverse_lookup_is_consistent() {
        assert_eq!(get_prefix_by_namespace(SOAP_1_2_NS), Some("soap"));
        assert_eq!(get_prefix_by_namespace("urn:unknown"), None);
    }
}
