//! Business-rule validators that span more than one value object.
//!
//! Per-object invariants (date ordering, mandatory fields, mutual exclusion)
//! are enforced at construction time in [`crate::model`]; this module covers
//! checks that need the rest of a batch or prior state to decide.

use crate::model::RatePlan;
use std::collections::HashSet;
use travelclick_common::ErrorKind;

/// Validate that every linked rate plan's master exists, either earlier in
/// the same batch or in a caller-supplied set of already-known plan codes.
pub fn validate_linked_rates(
    batch: &[RatePlan],
    known_plan_codes: &HashSet<String>,
) -> Result<(), ErrorKind> {
    let mut seen: HashSet<&str> = HashSet::new();
    for plan in batch {
        if let Some(master) = &plan.linked_to {
            if !seen.contains(master.as_str()) && !known_plan_codes.contains(master) {
                return Err(ErrorKind::BusinessLogic {
                    message: format!(
                        "rate plan {} is linked to {} which does not exist in this batch or prior state",
                        plan.plan_code, master
                    ),
                });
            }
        }
        seen.insert(plan.plan_code.as_str());
    }
    Ok(())
}

/// Validate that every plan in a batch carries a currency — each plan is
/// internally consistent by construction, this just extends the check to
/// batch granularity for the builder's benefit.
pub fn validate_consistent_currency(batch: &[RatePlan]) -> Result<(), ErrorKind> {
    for plan in batch {
        if plan.currency.trim().is_empty() {
            return Err(ErrorKind::Validation {
                message: format!("rate plan {} has no currency", plan.plan_code),
                violations: vec![],
                warnings: vec![],
            });
        }
    }
    Ok(())
}

/// Compute the effective rate for a linked plan given its master's amount,
/// applying either a fixed offset or a percentage.
pub fn apply_linked_offset(master_amount: f64, plan: &RatePlan) -> f64 {
    if let Some(amount) = plan.offset_amount {
        master_amount + amount
    } else if let Some(percent) = plan.offset_percent {
        master_amount * (1.0 + percent / 100.0)
    } else {
        master_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::RateOperationType;

    fn plan(code: &str, linked_to: Option<&str>) -> RatePlan {
        RatePlan::new(
            code,
            "USD",
            linked_to.map(|s| s.to_string()),
            None,
            Some(-10.0),
            vec![],
            RateOperationType::RateUpdate,
        )
        .unwrap()
    }

    #[test]
    fn linked_master_in_same_batch_is_valid() {
        let batch = vec![plan("BAR", None), plan("AAA", Some("BAR"))];
        assert!(validate_linked_rates(&batch, &HashSet::new()).is_ok());
    }

    #[test]
    fn linked_master_missing_is_rejected() {
        let batch = vec![plan("AAA", Some("BAR"))];
        assert!(validate_linked_rates(&batch, &HashSet::new()).is_err());
    }

    #[test]
    fn percent_offset_applies_as_discount() {
        let p = plan("AAA", Some("BAR"));
        let result = apply_linked_offset(150.0, &p);
        assert!((result - 135.0).abs() < 1e-9);
    }
}
