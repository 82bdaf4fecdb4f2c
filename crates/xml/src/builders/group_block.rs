//! `OTA_HotelInvBlockNotifRQ` body builder.

use super::common::*;
use chrono::{DateTime, Utc};
use travelclick_domain::GroupBlock;

pub fn build_body(
    timestamp: DateTime<Utc>,
    echo_token: Option<&str>,
    blocks: &[GroupBlock],
) -> Result<Vec<u8>, quick_xml::Error> {
    let mut w = new_writer();

    let ts = format_datetime(timestamp);
    let mut root_attrs = vec![ota_xmlns(), ("TimeStamp", ts.as_str())];
    if let Some(token) = echo_token {
        root_attrs.push(("EchoToken", token));
    }
    root_attrs.push(("Version", "4.000"));
    write_open(&mut w, "ota:OTA_HotelInvBlockNotifRQ", &root_attrs)?;

    write_open(&mut w, "ota:InvBlocks", &[])?;
    for block in blocks {
        write_open(&mut w, "ota:InvBlock", &[("HotelCode", block.hotel_code.as_str())])?;
        write_text(&mut w, "ota:BlockCode", &block.block_code)?;

        let start = format_date(block.start_date);
        let end = format_date(block.end_date);
        let allotment = block.allotment.to_string();
        write_empty(
            &mut w,
            "ota:InvBlockDates",
            &[
                ("InvTypeCode", block.room_type_code.as_str()),
                ("Start", start.as_str()),
                ("End", end.as_str()),
                ("Allotment", allotment.as_str()),
            ],
        )?;

        write_close(&mut w, "ota:InvBlock")?;
    }
    write_close(&mut w, "ota:InvBlocks")?;

    write_close(&mut w, "ota:OTA_HotelInvBlockNotifRQ")?;

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
    fn builds_group_block_allotment() {
        let block = GroupBlock::new("HOTEL001", "GRP-2026-A", "KING", date(2026, 9, 1), date(2026, 9, 5), 25).unwrap();
        let xml = build_body(Utc.with_ymd_and_hms(2026, 7, 27, 10, 0, 0).unwrap(), None, &[block]).unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains("GRP-2026-A"));
        assert!(xml.contains(r#"Allotment="25""#));
    }
}
