//! Shared writer helpers for the per-type body builders.

use chrono::{DateTime, NaiveDate, Utc};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

pub type XmlWriter = Writer<Cursor<Vec<u8>>>;

pub fn new_writer() -> XmlWriter {
    Writer::new(Cursor::new(Vec::new()))
}

pub fn finish(writer: XmlWriter) -> Vec<u8> {
    writer.into_inner().into_inner()
}

pub fn start<'a>(name: &'a str, attrs: &[(&str, &str)]) -> BytesStart<'a> {
    let mut el = BytesStart::new(name);
    for (k, v) in attrs {
        el.push_attribute((*k, *v));
    }
    el
}

pub fn write_empty(writer: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> quick_xml::Result<()> {
    writer.write_event(Event::Empty(start(name, attrs)))
}

pub fn write_open(writer: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(start(name, attrs)))
}

pub fn write_close(writer: &mut XmlWriter, name: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))
}

pub fn write_text(writer: &mut XmlWriter, name: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))
}

/// `xmlns:ota` attribute declared on every body root, so a builder's
/// output validates against its XSD standalone as well as once spliced
/// into a SOAP envelope.
pub fn ota_xmlns() -> (&'static str, &'static str) {
    ("xmlns:ota", crate::namespace::get_namespace_by_prefix("ota").expect("ota registered"))
}

/// `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM-DDTHH:MM:SS`.
pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}
