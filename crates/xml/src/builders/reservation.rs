//! `OTA_HotelResNotifRQ` body builder.

use super::common::*;
use chrono::{DateTime, Utc};
use travelclick_domain::{Reservation, TransactionType};

fn res_status(transaction_type: TransactionType) -> &'static str {
    match transaction_type {
        TransactionType::New => "Commit",
        TransactionType::Modify => "Modify",
        TransactionType::Cancel => "Cancel",
    }
}

/// Build the reservation notification body for a single reservation. Unlike
/// inventory/rate batches, HTNG 2011B carries one `HotelReservation` per
/// message for this gateway.
pub fn build_body(
    hotel_code: &str,
    timestamp: DateTime<Utc>,
    echo_token: Option<&str>,
    reservation: &Reservation,
) -> Result<Vec<u8>, quick_xml::Error> {
    let mut w = new_writer();

    let ts = format_datetime(timestamp);
    let status = res_status(reservation.transaction_type);
    let mut root_attrs = vec![ota_xmlns(), ("TimeStamp", ts.as_str())];
    if let Some(token) = echo_token {
        root_attrs.push(("EchoToken", token));
    }
    root_attrs.push(("Version", "4.000"));
    root_attrs.push(("ResStatus", status));
    write_open(&mut w, "ota:OTA_HotelResNotifRQ", &root_attrs)?;

    write_open(&mut w, "ota:HotelReservations", &[])?;
    write_open(&mut w, "ota:HotelReservation", &[])?;

    let confirmation = reservation.confirmation_number.as_deref();

    write_open(&mut w, "ota:RoomStays", &[])?;
    for stay in &reservation.room_stays {
        let rate = format!("{:.2}", stay.rate_per_night);
        let mut attrs = vec![
            ("RoomType", stay.room_type_code.as_str()),
            ("RatePerNight", rate.as_str()),
        ];
        attrs.push(("HotelCode", hotel_code));
        if let Some(conf) = confirmation {
            attrs.push(("ConfirmationNumber", conf));
        }
        write_empty(&mut w, "ota:RoomStay", &attrs)?;
    }
    write_close(&mut w, "ota:RoomStays")?;

    write_open(&mut w, "ota:ResGuests", &[])?;
    for stay in &reservation.room_stays {
        let adults = stay.adults.to_string();
        let children = stay.children.to_string();
        let infants = stay.infants.to_string();
        write_empty(
            &mut w,
            "ota:ResGuest",
            &[
                ("RoomType", stay.room_type_code.as_str()),
                ("Adults", adults.as_str()),
                ("Children", children.as_str()),
                ("Infants", infants.as_str()),
            ],
        )?;
    }
    write_close(&mut w, "ota:ResGuests")?;

    write_close(&mut w, "ota:HotelReservation")?;
    write_close(&mut w, "ota:HotelReservations")?;

    write_close(&mut w, "ota:OTA_HotelResNotifRQ")?;

    Ok(finish(w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use travelclick_domain::{ReservationType, RoomStay};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_reservation_emits_commit_status() {
        let res = Reservation::new(
            None,
            TransactionType::New,
            ReservationType::Transient,
            date(2026, 8, 1),
            date(2026, 8, 3),
            vec![RoomStay {
                room_type_code: "KING".into(),
                rate_per_night: 199.0,
                adults: 2,
                children: 0,
                infants: 0,
            }],
            vec![],
            None,
            None,
            None,
        )
        .unwrap();
        let xml = build_body(
            "HOTEL001",
            Utc.with_ymd_and_hms(2026, 7, 27, 10, 0, 0).unwrap(),
            None,
            &res,
        )
        .unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains(r#"ResStatus="Commit""#));
        assert!(xml.contains(r#"Adults="2""#));
    }

    #[test]
    fn cancel_reservation_carries_confirmation_number() {
        let res = Reservation::new(
            Some("CONF999".into()),
            TransactionType::Cancel,
            ReservationType::Transient,
            date(2026, 8, 1),
            date(2026, 8, 3),
            vec![RoomStay {
                room_type_code: "KING".into(),
                rate_per_night: 199.0,
                adults: 1,
                children: 0,
                infants: 0,
            }],
            vec![],
            None,
            None,
            None,
        )
        .unwrap();
        let xml = build_body(
            "HOTEL001",
            Utc.with_ymd_and_hms(2026, 7, 27, 10, 0, 0).unwrap(),
            None,
            &res,
        )
        .unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains(r#"ResStatus="Cancel""#));
        assert!(xml.contains("CONF999"));
    }
}
