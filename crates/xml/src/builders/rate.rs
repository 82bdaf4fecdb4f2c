//! `OTA_HotelRateNotifRQ` body builder.

use super::common::*;
use chrono::{DateTime, Utc};
use travelclick_domain::validation::apply_linked_offset;
use travelclick_domain::{RateLine, RatePlan};

/// Resolve the rate lines to emit for `plan`. A plan that carries its own
/// lines is emitted as-is (the "filtered pass-through" configuration). A
/// linked plan with no lines of its own is expanded from `master`'s lines
/// by applying the plan's offset to every guest amount (the "expanded"
/// configuration).
fn resolve_lines(plan: &RatePlan, master: Option<&RatePlan>) -> Vec<RateLine> {
    if !plan.rates.is_empty() {
        return plan.rates.clone();
    }
    let Some(master) = master else {
        return Vec::new();
    };
    master
        .rates
        .iter()
        .map(|line| RateLine {
            room_type_code: line.room_type_code.clone(),
            start_date: line.start_date,
            end_date: line.end_date,
            guest_amounts: line
                .guest_amounts
                .iter()
                .map(|&amt| apply_linked_offset(amt, plan))
                .collect(),
            commissionable: line.commissionable,
            market_code: line.market_code.clone(),
            max_guests: line.max_guests,
            meal_plan: line.meal_plan.clone(),
        })
        .collect()
}

/// Build the rate notification body for a batch of plans belonging to a
/// single hotel. `master_lookup` resolves a linked plan's master by plan
/// code; pass a closure over the same batch (or prior persisted state).
pub fn build_body<'a>(
    hotel_code: &str,
    timestamp: DateTime<Utc>,
    echo_token: Option<&str>,
    plans: &[RatePlan],
    master_lookup: impl Fn(&str) -> Option<&'a RatePlan>,
) -> Result<Vec<u8>, quick_xml::Error> {
    let mut w = new_writer();

    let ts = format_datetime(timestamp);
    let mut root_attrs = vec![ota_xmlns(), ("TimeStamp", ts.as_str())];
    if let Some(token) = echo_token {
        root_attrs.push(("EchoToken", token));
    }
    root_attrs.push(("Version", "4.000"));
    write_open(&mut w, "ota:OTA_HotelRateNotifRQ", &root_attrs)?;

    write_open(&mut w, "ota:RateAmountMessages", &[])?;
    for plan in plans {
        write_open(
            &mut w,
            "ota:RateAmountMessage",
            &[("RatePlanCode", plan.plan_code.as_str())],
        )?;
        write_empty(
            &mut w,
            "ota:StatusApplicationControl",
            &[("HotelCode", hotel_code)],
        )?;

        let master = plan
            .linked_to
            .as_deref()
            .and_then(|code| master_lookup(code));
        let lines = resolve_lines(plan, master);

        write_open(&mut w, "ota:Rates", &[])?;
        for line in &lines {
            let start = format_date(line.start_date);
            let end = format_date(line.end_date);
            write_open(
                &mut w,
                "ota:Rate",
                &[
                    ("CurrencyCode", plan.currency.as_str()),
                    ("Start", start.as_str()),
                    ("End", end.as_str()),
                ],
            )?;
            write_open(&mut w, "ota:BaseByGuestAmts", &[])?;
            for (idx, amount) in line.guest_amounts.iter().enumerate() {
                let amount_str = format!("{amount:.2}");
                let guests = (idx + 1).to_string();
                write_empty(
                    &mut w,
                    "ota:BaseByGuestAmt",
                    &[
                        ("AmountAfterTax", amount_str.as_str()),
                        ("NumberOfGuests", guests.as_str()),
                    ],
                )?;
            }
            write_close(&mut w, "ota:BaseByGuestAmts")?;
            write_close(&mut w, "ota:Rate")?;
        }
        write_close(&mut w, "ota:Rates")?;

        write_close(&mut w, "ota:RateAmountMessage")?;
    }
    write_close(&mut w, "ota:RateAmountMessages")?;

    write_close(&mut w, "ota:OTA_HotelRateNotifRQ")?;

    Ok(finish(w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use travelclick_domain::RateOperationType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn master_plan() -> RatePlan {
        RatePlan::new(
            "BAR",
            "USD",
            None,
            None,
            None,
            vec![RateLine {
                room_type_code: "KING".into(),
                start_date: date(2026, 8, 1),
                end_date: date(2026, 8, 10),
                guest_amounts: vec![150.0, 150.0],
                commissionable: Some(true),
                market_code: None,
                max_guests: None,
                meal_plan: None,
            }],
            RateOperationType::RateUpdate,
        )
        .unwrap()
    }

    #[test]
    fn standalone_plan_emits_its_own_lines() {
        let plan = master_plan();
        let xml = build_body(
            "HOTEL001",
            Utc.with_ymd_and_hms(2026, 7, 27, 10, 0, 0).unwrap(),
            None,
            &[plan],
            |_| None,
        )
        .unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains(r#"RatePlanCode="BAR""#));
        assert!(xml.contains(r#"AmountAfterTax="150.00""#));
    }

    #[test]
    fn linked_plan_expands_from_master_with_offset() {
        let master = master_plan();
        let linked = RatePlan::new("AAA", "USD", Some("BAR".into()), None, Some(-10.0), vec![], RateOperationType::RateUpdate).unwrap();
        let xml = build_body(
            "HOTEL001",
            Utc.with_ymd_and_hms(2026, 7, 27, 10, 0, 0).unwrap(),
            None,
            &[linked],
            |code| if code == "BAR" { Some(&master) } else { None },
        )
        .unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains(r#"AmountAfterTax="135.00""#));
    }
}
