//! Minimal structured extraction from an inbound `..._RQ` body fragment.
//!
//! This gateway's idempotency guard only needs the confirmation number (for
//! reservations) out of the body; the rest of the DTO construction for a
//! dispatched job is the external handler's responsibility.

use roxmltree::Document;
use travelclick_common::ErrorKind;

fn malformed(message: impl Into<String>) -> ErrorKind {
    ErrorKind::SoapXml {
        fault_code: Some("Client".to_string()),
        message: message.into(),
        server_side: false,
    }
}

/// Extract a confirmation number from a reservation body, checking the
/// OTA `HotelReservationID`/`UniqueID` shapes CRS peers commonly send it
/// in: `ResGlobalInfo/HotelReservationIDs/HotelReservationID[@ResID_Type]`
/// with `ResID_Value`, falling back to a bare `UniqueID` with `ID`.
pub fn extract_confirmation_number(body_xml: &[u8]) -> Result<Option<String>, ErrorKind> {
    let text = std::str::from_utf8(body_xml).map_err(|e| malformed(format!("body is not valid UTF-8: {e}")))?;
    let doc = Document::parse(text).map_err(|e| malformed(format!("body is not well-formed XML: {e}")))?;
    let root = doc.root_element();

    if let Some(node) = root
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "HotelReservationID")
    {
        if let Some(value) = node.attribute("ResID_Value") {
            return Ok(Some(value.to_string()));
        }
    }

    if let Some(node) = root
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "UniqueID")
    {
        if let Some(value) = node.attribute("ID") {
            return Ok(Some(value.to_string()));
        }
    }

    Ok(None)
}

/// Extract a hotel code embedded directly in the body (`HotelCode`
/// attribute on the root or a descendant), used when the SOAP header
/// carried none.
pub fn extract_hotel_code(body_xml: &[u8]) -> Result<Option<String>, ErrorKind> {
    let text = std::str::from_utf8(body_xml).map_err(|e| malformed(format!("body is not valid UTF-8: {e}")))?;
    let doc = Document::parse(text).map_err(|e| malformed(format!("body is not well-formed XML: {e}")))?;
    let root = doc.root_element();

    if let Some(value) = root.attribute("HotelCode") {
        return Ok(Some(value.to_string()));
    }
    Ok(root
        .descendants()
        .find_map(|n| n.attribute("HotelCode"))
        .map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_confirmation_number_from_hotel_reservation_id() {
        let body = br#"<OTA_HotelResNotifRQ><HotelReservations><HotelReservation>
            <ResGlobalInfo><HotelReservationIDs>
                <HotelReservationID ResID_Type="10" ResID_Value="CONF-123"/>
            </HotelReservationIDs></ResGlobalInfo>
        </HotelReservation></HotelReservations></OTA_HotelResNotifRQ>"#;
        assert_eq!(extract_confirmation_number(body).unwrap().as_deref(), Some("CONF-123"));
    }

    #[test]
    fn falls_back_to_unique_id() {
        let body = br#"<OTA_HotelResNotifRQ><UniqueID Type="14" ID="ALT-9"/></OTA_HotelResNotifRQ>"#;
        assert_eq!(extract_confirmation_number(body).unwrap().as_deref(), Some("ALT-9"));
    }

    #[test]
    fn returns_none_when_absent() {
        let body = br#"<OTA_HotelInvCountNotifRQ HotelCode="HOTEL001"/>"#;
        assert_eq!(extract_confirmation_number(body).unwrap(), None);
        assert_eq!(extract_hotel_code(body).unwrap().as_deref(), Some("HOTEL001"));
    }
}
