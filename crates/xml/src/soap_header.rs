//! SOAP header builder: WS-Addressing + WSSE UsernameToken.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use rand::RngCore;
use std::io::Cursor;

/// Default WS-Addressing action for HTNG 2011B submissions.
pub const DEFAULT_ACTION: &str = "HTNG2011B_SubmitRequest";
/// Anonymous reply-to address.
pub const ANONYMOUS_REPLY_TO: &str = "http://www.w3.org/2005/08/addressing/anonymous";

/// Inputs for the WSSE `UsernameToken`. `nonce` and `created` are supplied
/// by the caller so the builder stays deterministic and testable; callers
/// use [`generate_nonce`] and `Utc::now()` in production.
#[derive(Debug, Clone)]
pub struct WsseCredentials {
    pub username: String,
    pub password: String,
    pub nonce: Vec<u8>,
    pub created: DateTime<Utc>,
}

/// Generate 16 random bytes for a WSSE nonce.
pub fn generate_nonce() -> Vec<u8> {
    let mut bytes = vec![0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// Everything needed to stamp a SOAP header.
#[derive(Debug, Clone)]
pub struct SoapHeaderInputs {
    pub message_id: String,
    pub to: String,
    pub hotel_code: String,
    pub action: String,
    pub credentials: WsseCredentials,
}

impl SoapHeaderInputs {
    pub fn new(message_id: impl Into<String>, to: impl Into<String>, hotel_code: impl Into<String>, credentials: WsseCredentials) -> Self {
        Self {
            message_id: message_id.into(),
            to: to.into(),
            hotel_code: hotel_code.into(),
            action: DEFAULT_ACTION.to_string(),
            credentials,
        }
    }
}

fn write_text_element(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Build the `<soap:Header>` block. Output is deterministic given
/// `inputs` — the only non-deterministic inputs (nonce, timestamp) are
/// supplied by the caller, not generated inside this function.
pub fn build_header(inputs: &SoapHeaderInputs) -> Result<Vec<u8>, quick_xml::Error> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Start(BytesStart::new("soap:Header")))?;

    write_text_element(&mut writer, "wsa:MessageID", &inputs.message_id)?;
    write_text_element(&mut writer, "wsa:To", &inputs.to)?;

    writer.write_event(Event::Start(BytesStart::new("wsa:From")))?;
    writer.write_event(Event::Start(BytesStart::new("wsa:ReferenceProperties")))?;
    write_text_element(&mut writer, "htn:HotelCode", &inputs.hotel_code)?;
    writer.write_event(Event::End(BytesEnd::new("wsa:ReferenceProperties")))?;
    writer.write_event(Event::End(BytesEnd::new("wsa:From")))?;

    writer.write_event(Event::Start(BytesStart::new("wsa:ReplyTo")))?;
    write_text_element(&mut writer, "wsa:Address", ANONYMOUS_REPLY_TO)?;
    writer.write_event(Event::End(BytesEnd::new("wsa:ReplyTo")))?;

    write_text_element(&mut writer, "wsa:Action", &inputs.action)?;

    writer.write_event(Event::Start(BytesStart::new("wsse:Security")))?;
    writer.write_event(Event::Start(BytesStart::new("wsse:UsernameToken")))?;
    write_text_element(&mut writer, "wsse:Username", &inputs.credentials.username)?;

    let mut password_el = BytesStart::new("wsse:Password");
    password_el.push_attribute(("Type", "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordText"));
    writer.write_event(Event::Start(password_el))?;
    writer.write_event(Event::Text(BytesText::new(&inputs.credentials.password)))?;
    writer.write_event(Event::End(BytesEnd::new("wsse:Password")))?;

    let mut nonce_el = BytesStart::new("wsse:Nonce");
    nonce_el.push_attribute(("EncodingType", "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary"));
    writer.write_event(Event::Start(nonce_el))?;
    writer.write_event(Event::Text(BytesText::new(&BASE64.encode(&inputs.credentials.nonce))))?;
    writer.write_event(Event::End(BytesEnd::new("wsse:Nonce")))?;

    write_text_element(
        &mut writer,
        "wsu:Created",
        &inputs
            .credentials
            .created
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string(),
    )?;

    writer.write_event(Event::End(BytesEnd::new("wsse:UsernameToken")))?;
    writer.write_event(Event::End(BytesEnd::new("wsse:Security")))?;

    writer.write_event(Event::End(BytesEnd::new("soap:Header")))?;

    Ok(writer.into_inner().into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_inputs() -> SoapHeaderInputs {
        SoapHeaderInputs::new(
            "msg-1",
            "https://crs.example.com/soap",
            "HOTEL001",
            WsseCredentials {
                username: "svc".into(),
                password: "sekrit123".into(),
                nonce: vec![0u8; 16],
                created: Utc.with_ymd_and_hms(2026, 7, 27, 12, 0, 0).unwrap(),
            },
        )
    }

    #[test]
    fn deterministic_given_fixed_nonce_and_timestamp() {
        let a = build_header(&fixed_inputs()).unwrap();
        let b = build_header(&fixed_inputs()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn includes_hotel_code_and_message_id() {
        let xml = String::from_utf8(build_header(&fixed_inputs()).unwrap()).unwrap();
        assert!(xml.contains("HOTEL001"));
        assert!(xml.contains("msg-1"));
        assert!(xml.contains(ANONYMOUS_REPLY_TO));
        assert!(xml.contains("PasswordText"));
    }

    #[test]
    fn nonce_differs_run_to_run() {
        let n1 = generate_nonce();
        let n2 = generate_nonce();
        assert_eq!(n1.len(), 16);
        assert_ne!(n1, n2);
    }
}
