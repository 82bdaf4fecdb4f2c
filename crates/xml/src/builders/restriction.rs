//! `OTA_HotelAvailNotifRQ` body builder.

use super::common::*;
use chrono::{DateTime, Utc};
use travelclick_domain::RestrictionItem;

pub fn build_body(
    timestamp: DateTime<Utc>,
    echo_token: Option<&str>,
    items: &[RestrictionItem],
) -> Result<Vec<u8>, quick_xml::Error> {
    let mut w = new_writer();

    let ts = format_datetime(timestamp);
    let mut root_attrs = vec![ota_xmlns(), ("TimeStamp", ts.as_str())];
    if let Some(token) = echo_token {
        root_attrs.push(("EchoToken", token));
    }
    root_attrs.push(("Version", "4.000"));
    write_open(&mut w, "ota:OTA_HotelAvailNotifRQ", &root_attrs)?;

    write_open(&mut w, "ota:AvailStatusMessages", &[])?;
    for item in items {
        write_open(&mut w, "ota:AvailStatusMessage", &[])?;

        let start = format_date(item.start_date);
        let end = format_date(item.end_date);
        write_empty(
            &mut w,
            "ota:StatusApplicationControl",
            &[
                ("HotelCode", item.hotel_code.as_str()),
                ("InvTypeCode", item.room_type_code.as_str()),
                ("Start", start.as_str()),
                ("End", end.as_str()),
            ],
        )?;

        let value_str = item.value.map(|v| v.to_string());
        let mut restriction_attrs = vec![("Restriction", item.restriction_code.as_str())];
        if let Some(value) = value_str.as_deref() {
            restriction_attrs.push(("Value", value));
        }
        write_empty(&mut w, "ota:RestrictionStatus", &restriction_attrs)?;

        write_close(&mut w, "ota:AvailStatusMessage")?;
    }
    write_close(&mut w, "ota:AvailStatusMessages")?;

    write_close(&mut w, "ota:OTA_HotelAvailNotifRQ")?;

    Ok(finish(w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn builds_min_los_restriction() {
        let item = RestrictionItem::new("HOTEL001", "KING", date(2026, 8, 1), date(2026, 8, 5), "MIN_LOS", Some(2)).unwrap();
        let xml = build_body(Utc.with_ymd_and_hms(2026, 7, 27, 10, 0, 0).unwrap(), None, &[item]).unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains(r#"Restriction="MIN_LOS""#));
        assert!(xml.contains(r#"Value="2""#));
    }
}
