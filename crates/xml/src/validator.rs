//! Two-stage XML validation: well-formedness, then XSD.

use crate::schema;
use libxml::parser::Parser as LibXmlParser;
use libxml::schemas::{SchemaParserContext, SchemaValidationContext};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use travelclick_domain::MessageType;

/// A single validation problem, in the shape the orchestrator and the
/// inbound fault synthesizer both consume.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub line: u32,
    pub column: u32,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    fn well_formedness(message: impl Into<String>) -> Self {
        Self {
            line: 0,
            column: 0,
            code: "WELL_FORMEDNESS".to_string(),
            message: message.into(),
        }
    }
}

/// Stage 1: streaming well-formedness check. Cheap, and catches the large
/// majority of malformed inputs before we pay for XSD parsing.
pub fn check_well_formed(xml: &[u8]) -> Vec<ValidationIssue> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut issues = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                issues.push(ValidationIssue::well_formedness(format!(
                    "XML parse error at byte {}: {e}",
                    reader.buffer_position()
                )));
                break;
            }
        }
        buf.clear();
    }
    issues
}

/// Stage 2: validate against the XSD registered for `message_type`. Returns
/// an empty vec if the message type has no registered schema (the caller
/// should already have rejected RESPONSE/UNKNOWN for outbound use).
pub fn check_xsd(xml: &[u8], message_type: MessageType) -> Vec<ValidationIssue> {
    let Some(xsd) = schema::xsd_for(message_type) else {
        return vec![ValidationIssue {
            line: 0,
            column: 0,
            code: "NO_SCHEMA".to_string(),
            message: format!("no XSD registered for {message_type}"),
        }];
    };

    let xml_str = match std::str::from_utf8(xml) {
        Ok(s) => s,
        Err(e) => return vec![ValidationIssue::well_formedness(format!("document is not valid UTF-8: {e}"))],
    };

    let doc = match LibXmlParser::default().parse_string(xml_str) {
        Ok(doc) => doc,
        Err(e) => {
            return vec![ValidationIssue::well_formedness(format!(
                "document failed to parse for XSD validation: {e}"
            ))]
        }
    };

    let mut schema_parser = match SchemaParserContext::from_buffer(xsd) {
        Ok(ctx) => ctx,
        Err(e) => {
            return vec![ValidationIssue {
                line: 0,
                column: 0,
                code: "SCHEMA_LOAD_ERROR".to_string(),
                message: format!("failed to load XSD for {message_type}: {e}"),
            }]
        }
    };

    let mut schema = match SchemaValidationContext::from_parser(&mut schema_parser) {
        Ok(ctx) => ctx,
        Err(errors) => {
            return errors
                .iter()
                .map(|e| ValidationIssue {
                    line: e.line as u32,
                    column: 0,
                    code: "SCHEMA_PARSE_ERROR".to_string(),
                    message: e.message.clone().unwrap_or_default(),
                })
                .collect()
        }
    };

    match schema.validate_document(&doc) {
        Ok(()) => vec![],
        Err(errors) => errors
            .iter()
            .map(|e| ValidationIssue {
                line: e.line as u32,
                column: 0,
                code: "XSD_VIOLATION".to_string(),
                message: e.message.clone().unwrap_or_default(),
            })
            .collect(),
    }
}

/// Run both stages. Stage 2 is skipped if stage 1 already failed — an XSD
/// parse of malformed XML is not informative.
pub fn validate(xml: &[u8], message_type: MessageType) -> Vec<ValidationIssue> {
    let well_formed = check_well_formed(xml);
    if !well_formed.is_empty() {
        return well_formed;
    }
    check_xsd(xml, message_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_malformed_xml() {
        let issues = check_well_formed(b"<Foo><Bar></Foo>");
        assert!(!issues.is_empty());
        assert_eq!(issues[0].code, "WELL_FORMEDNESS");
    }

    #[test]
    fn well_formed_xml_has_no_stage1_issues() {
        let issues = check_well_formed(b"<Foo><Bar>1</Bar></Foo>");
        assert!(issues.is_empty());
    }
}
