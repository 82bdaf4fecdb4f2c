//! WSDL document for `GET /api/travelclick/soap/wsdl`.
//!
//! The document is embedded at compile time like the XSD schemas in
//! [`crate::schema`]; the `soap:address` location is filled in at request
//! time with the endpoint the gateway is actually configured to serve.

const WSDL_TEMPLATE: &str = include_str!("../schemas/service.wsdl");

/// Renders the WSDL with `endpoint` substituted for the service address.
pub fn render(endpoint: &str) -> String {
    WSDL_TEMPLATE.replace("{{ENDPOINT}}", endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_endpoint_into_service_address() {
        let doc = render("https://gateway.example.com/api/travelclick/soap");
        assert!(doc.contains("https://gateway.example.com/api/travelclick/soap"));
        assert!(!doc.contains("{{ENDPOINT}}"));
    }
}
