//! Per-MessageType outbound XML construction. Each submodule builds only the OTA body fragment for its
//! MessageType; [`wrap_envelope`] assembles the final SOAP envelope from a
//! header (see [`crate::soap_header`]) and a body.

pub mod common;
pub mod group_block;
pub mod inventory;
pub mod rate;
pub mod reservation;
pub mod response;
pub mod restriction;

use crate::namespace::{get_namespace_by_prefix, SOAP_1_2_NS};
use common::{finish, new_writer, start};
use quick_xml::events::{BytesEnd, BytesText, Event};

/// Wrap a pre-built header block and body fragment in a `soap:Envelope`
/// declaring every namespace this gateway uses, so the body fragment never
/// needs to declare its own `ota:`/`htn:` prefixes.
pub fn wrap_envelope(header: &[u8], body: &[u8]) -> Result<Vec<u8>, quick_xml::Error> {
    let mut w = new_writer();

    w.write_event(Event::Decl(quick_xml::events::BytesDecl::new(
        "1.0", Some("UTF-8"), None,
    )))?;

    let wsa = get_namespace_by_prefix("wsa").expect("wsa registered");
    let wsse = get_namespace_by_prefix("wsse").expect("wsse registered");
    let wsu = get_namespace_by_prefix("wsu").expect("wsu registered");
    let ota = get_namespace_by_prefix("ota").expect("ota registered");
    let htn = get_namespace_by_prefix("htn").expect("htn registered");
    let xsi = get_namespace_by_prefix("xsi").expect("xsi registered");
    let envelope_attrs: [(&str, &str); 7] = [
        ("xmlns:soap", SOAP_1_2_NS),
        ("xmlns:wsa", wsa),
        ("xmlns:wsse", wsse),
        ("xmlns:wsu", wsu),
        ("xmlns:ota", ota),
        ("xmlns:htn", htn),
        ("xmlns:xsi", xsi),
    ];
    w.write_event(Event::Start(start("soap:Envelope", &envelope_attrs)))?;

    write_raw(&mut w, header)?;
    write_raw_wrapped(&mut w, "soap:Body", body)?;

    w.write_event(Event::End(BytesEnd::new("soap:Envelope")))?;

    Ok(finish(w))
}

/// Splice an already-formed XML fragment verbatim, bypassing quick-xml's
/// text escaping — `header` and `body` are XML, not character data.
fn write_raw(writer: &mut common::XmlWriter, bytes: &[u8]) -> Result<(), quick_xml::Error> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| quick_xml::Error::Io(std::sync::Arc::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))))?;
    writer.write_event(Event::Text(BytesText::from_escaped(text)))
}

fn write_raw_wrapped(writer: &mut common::XmlWriter, wrapper: &str, bytes: &[u8]) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(start(wrapper, &[])))?;
    write_raw(writer, bytes)?;
    writer.write_event(Event::End(BytesEnd::new(wrapper)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_header_and_body_in_one_envelope() {
        let xml = wrap_envelope(b"<soap:Header/>", b"<ota:Foo/>").unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("soap:Envelope"));
        assert!(xml.contains("soap:Header"));
        assert!(xml.contains("soap:Body"));
        assert!(xml.contains("ota:Foo"));
    }
}
