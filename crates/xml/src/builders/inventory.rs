//! `OTA_HotelInvCountNotifRQ` body builder.

use super::common::*;
use chrono::{DateTime, Utc};
use travelclick_domain::{InventoryItem, InventoryMode};

/// Build the inventory notification body for one batch of items belonging
/// to a single hotel. Child order and attribute order are fixed so the
/// same inputs always produce byte-identical output.
pub fn build_body(
    hotel_code: &str,
    timestamp: DateTime<Utc>,
    echo_token: Option<&str>,
    items: &[InventoryItem],
) -> Result<Vec<u8>, quick_xml::Error> {
    let mut w = new_writer();

    let ts = format_datetime(timestamp);
    let mut root_attrs = vec![ota_xmlns(), ("TimeStamp", ts.as_str())];
    if let Some(token) = echo_token {
        root_attrs.push(("EchoToken", token));
    }
    root_attrs.push(("Version", "4.000"));
    root_attrs.push(("HotelCode", hotel_code));
    write_open(&mut w, "ota:OTA_HotelInvCountNotifRQ", &root_attrs)?;

    write_open(&mut w, "ota:Inventories", &[])?;
    for item in items {
        let overlay = matches!(item.mode, InventoryMode::Overlay);
        let inv_attrs: &[(&str, &str)] = if overlay {
            &[("Overlay", "true")]
        } else {
            &[]
        };
        write_open(&mut w, "ota:Inventory", inv_attrs)?;

        let start = format_date(item.start_date);
        let end = format_date(item.end_date);
        write_empty(
            &mut w,
            "ota:StatusApplicationControl",
            &[
                ("InvTypeCode", item.room_type_code.as_str()),
                ("Start", start.as_str()),
                ("End", end.as_str()),
            ],
        )?;

        write_open(&mut w, "ota:InvCounts", &[])?;
        for (count_type, count) in &item.counts {
            let code = count_type.code().to_string();
            let value = count.to_string();
            write_empty(
                &mut w,
                "ota:InvCount",
                &[("CountType", code.as_str()), ("Count", value.as_str())],
            )?;
        }
        write_close(&mut w, "ota:InvCounts")?;

        write_close(&mut w, "ota:Inventory")?;
    }
    write_close(&mut w, "ota:Inventories")?;

    write_close(&mut w, "ota:OTA_HotelInvCountNotifRQ")?;

    Ok(finish(w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use std::collections::BTreeMap;
    use travelclick_domain::CountType;

    fn date(y: i32, m: u32, d: u32) -> chrono::NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn builds_delta_inventory_without_overlay_attribute() {
        let mut counts = BTreeMap::new();
        counts.insert(CountType::Available, 12);
        let item = InventoryItem::new(
            "HOTEL001",
            "KING",
            date(2026, 8, 1),
            date(2026, 8, 2),
            counts,
            InventoryMode::Delta,
        )
        .unwrap();
        let xml = build_body(
            "HOTEL001",
            Utc.with_ymd_and_hms(2026, 7, 27, 10, 0, 0).unwrap(),
            None,
            &[item],
        )
        .unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains("OTA_HotelInvCountNotifRQ"));
        assert!(xml.contains(r#"CountType="2""#));
        assert!(!xml.contains("Overlay"));
    }

    #[test]
    fn builds_overlay_inventory_for_calculated_counts() {
        let mut counts = BTreeMap::new();
        counts.insert(CountType::DefiniteSold, 8);
        counts.insert(CountType::TentativeSold, 2);
        counts.insert(CountType::OutOfOrder, 1);
        counts.insert(CountType::Physical, 30);
        let item = InventoryItem::new(
            "HOTEL001",
            "KING",
            date(2026, 8, 1),
            date(2026, 8, 2),
            counts,
            InventoryMode::Overlay,
        )
        .unwrap();
        let xml = build_body(
            "HOTEL001",
            Utc.with_ymd_and_hms(2026, 7, 27, 10, 0, 0).unwrap(),
            Some("echo-1"),
            &[item],
        )
        .unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains(r#"Overlay="true""#));
        assert!(xml.contains("echo-1"));
    }
}
