//! Outbound response parsing. Consumes the CRS's `..._RS` body (already sliced out
//! of its envelope by [`crate::parsers::envelope::parse_envelope`]) and
//! extracts the OTA `Success`/`Warnings`/`Errors` acknowledgement shape.

use roxmltree::Document;
use travelclick_common::ErrorKind;

/// One `Error` or `Warning` element from an OTA response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseIssue {
    pub error_type: Option<String>,
    pub short_text: String,
}

/// Outcome of parsing a CRS response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub success: bool,
    pub warnings: Vec<ResponseIssue>,
    pub errors: Vec<ResponseIssue>,
}

fn malformed(message: impl Into<String>) -> ErrorKind {
    ErrorKind::SoapXml {
        fault_code: None,
        message: message.into(),
        server_side: true,
    }
}

fn collect_issues(root: roxmltree::Node, container: &str, item: &str) -> Vec<ResponseIssue> {
    root.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == container)
        .map(|c| {
            c.children()
                .filter(|n| n.is_element() && n.tag_name().name() == item)
                .map(|n| ResponseIssue {
                    error_type: n.attribute("Type").map(str::to_string),
                    short_text: n
                        .attribute("ShortText")
                        .map(str::to_string)
                        .or_else(|| n.text().map(str::to_string))
                        .unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Parse a single `..._RS` body fragment.
pub fn parse_response(body_xml: &[u8]) -> Result<ParsedResponse, ErrorKind> {
    let text = std::str::from_utf8(body_xml).map_err(|e| malformed(format!("response is not valid UTF-8: {e}")))?;
    let doc = Document::parse(text).map_err(|e| malformed(format!("response is not well-formed XML: {e}")))?;
    let root = doc.root_element();

    let errors = collect_issues(root, "Errors", "Error");
    let warnings = collect_issues(root, "Warnings", "Warning");
    let has_success = root
        .descendants()
        .any(|n| n.is_element() && n.tag_name().name() == "Success");

    Ok(ParsedResponse {
        success: has_success && errors.is_empty(),
        warnings,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_success_response() {
        let body = br#"<OTA_HotelInvCountNotifRS TimeStamp="2026-07-27T10:00:00" Version="4.000"><Success/></OTA_HotelInvCountNotifRS>"#;
        let parsed = parse_response(body).unwrap();
        assert!(parsed.success);
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn parses_error_response() {
        let body = br#"<OTA_HotelInvCountNotifRS><Errors><Error Type="3" ShortText="Invalid hotel code"/></Errors></OTA_HotelInvCountNotifRS>"#;
        let parsed = parse_response(body).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].short_text, "Invalid hotel code");
    }

    #[test]
    fn parses_success_with_warnings() {
        let body = br#"<OTA_HotelRateNotifRS><Success/><Warnings><Warning Type="1" ShortText="rate rounded"/></Warnings></OTA_HotelRateNotifRS>"#;
        let parsed = parse_response(body).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.warnings.len(), 1);
    }
}
