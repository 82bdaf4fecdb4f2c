//! Inbound acknowledgement and fault body builders. Counterpart to the
//! per-type request builders in this module: those build `..._RQ` bodies
//! for outbound; these build the `..._RS` acknowledgement and
//! `soap:Fault` bodies this gateway sends back on the inbound side.

use super::common::*;
use travelclick_domain::MessageType;

/// The `..._RS` root element name this gateway acknowledges with, for a
/// classified inbound `..._RQ`. Falls back to a generic envelope for
/// message types that don't carry a body root of their own.
fn success_root(message_type: MessageType) -> String {
    match message_type.body_root() {
        Some(root) => root.replacen("RQ", "RS", 1),
        None => "OTA_NotifRS".to_string(),
    }
}

/// Build a bare `<ota:Success/>` acknowledgement body for `message_type`.
pub fn build_ack_body(message_type: MessageType) -> Result<Vec<u8>, quick_xml::Error> {
    let mut w = new_writer();
    let root = success_root(message_type);
    write_open(&mut w, &format!("ota:{root}"), &[ota_xmlns()])?;
    write_empty(&mut w, "Success", &[])?;
    write_close(&mut w, &format!("ota:{root}"))?;
    Ok(finish(w))
}

/// Build a SOAP 1.2 `Fault` body. `code` is the two-part fault code
/// (`soap:Client` or `soap:Server` — internal errors map to `Server`
/// faultcode, validation failures to `Client`); `reason` is the
/// human-readable faultstring.
pub fn build_fault_body(code: &str, reason: &str) -> Result<Vec<u8>, quick_xml::Error> {
    let mut w = new_writer();
    write_open(&mut w, "soap:Fault", &[])?;
    write_open(&mut w, "soap:Code", &[])?;
    write_text(&mut w, "soap:Value", code)?;
    write_close(&mut w, "soap:Code")?;
    write_open(&mut w, "soap:Reason", &[])?;
    write_text(&mut w, "soap:Text", reason)?;
    write_close(&mut w, "soap:Reason")?;
    write_close(&mut w, "soap:Fault")?;
    Ok(finish(w))
}

/// Build a `<soap:Header>` carrying only `wsa:RelatesTo`, for
/// acknowledgement responses. Faults carry no header.
pub fn build_relates_to_header(request_message_id: &str) -> Result<Vec<u8>, quick_xml::Error> {
    let mut w = new_writer();
    write_open(&mut w, "soap:Header", &[])?;
    write_text(&mut w, "wsa:RelatesTo", request_message_id)?;
    write_close(&mut w, "soap:Header")?;
    Ok(finish(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_body_substitutes_rs_for_rq() {
        let xml = String::from_utf8(build_ack_body(MessageType::Reservation).unwrap()).unwrap();
        assert!(xml.contains("OTA_HotelResNotifRS"));
        assert!(xml.contains("Success"));
    }

    #[test]
    fn fault_body_carries_code_and_reason() {
        let xml = String::from_utf8(build_fault_body("soap:Client", "Authentication Error: bad password").unwrap()).unwrap();
        assert!(xml.contains("soap:Client"));
        assert!(xml.contains("Authentication Error"));
    }

    #[test]
    fn relates_to_header_carries_message_id() {
        let xml = String::from_utf8(build_relates_to_header("msg-1").unwrap()).unwrap();
        assert!(xml.contains("wsa:RelatesTo"));
        assert!(xml.contains("msg-1"));
    }
}
