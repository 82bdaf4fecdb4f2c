//! Sync-status health-score computation and query predicates. Persistence
//! of the tracked row lives in `travelclick-db`; this module is the pure
//! compute each terminal [`AuditEntry`] transition feeds into.

use chrono::{DateTime, Utc};
use travelclick_domain::SyncStatus;

/// `max(0, 100 − 2·retry_count − 30·failure_flag − max(0, days_since_last_success − 1)·5)`,
/// clamped to `[0, 100]`.
pub fn health_score(retry_count: u32, failed: bool, last_success: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u8 {
    let days_since_last_success = last_success
        .map(|ts| (now - ts).num_days().max(0))
        .unwrap_or(0);
    let failure_penalty = if failed { 30 } else { 0 };
    let staleness_penalty = (days_since_last_success - 1).max(0) * 5;

    let score = 100i64 - 2 * retry_count as i64 - failure_penalty - staleness_penalty;
    score.clamp(0, 100) as u8
}

/// Recompute and apply the health score on `status` in place, given the
/// outcome of the terminal transition that just happened.
pub fn apply_transition(status: &mut SyncStatus, failed: bool, now: DateTime<Utc>) {
    status.last_attempt = Some(now);
    if !failed {
        status.last_success = Some(now);
        status.retry_count = 0;
    } else {
        status.retry_count += 1;
    }
    status.health_score = health_score(status.retry_count, failed, status.last_success, now);
}

/// Needs-attention query: anything not comfortably healthy.
pub fn needs_attention(status: &SyncStatus) -> bool {
    status.health_score < 70
}

/// Low-success-rate query against a caller-supplied threshold.
pub fn is_low_success_rate(status: &SyncStatus, threshold: f64) -> bool {
    status.success_rate < threshold
}

/// Long-running query: still Syncing after 30 minutes.
pub fn is_long_running(status: &SyncStatus, now: DateTime<Utc>) -> bool {
    use travelclick_domain::SyncStatusValue;
    status.status == SyncStatusValue::Syncing
        && status
            .last_attempt
            .map(|started| now - started > chrono::Duration::minutes(30))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 27, 12, 0, 0).unwrap()
    }

    #[test]
    fn perfect_health_with_no_retries_no_failure_recent_success() {
        assert_eq!(health_score(0, false, Some(now()), now()), 100);
    }

    #[test]
    fn retry_count_subtracts_two_points_each() {
        assert_eq!(health_score(5, false, Some(now()), now()), 90);
    }

    #[test]
    fn failure_subtracts_thirty_points() {
        assert_eq!(health_score(0, true, Some(now()), now()), 70);
    }

    #[test]
    fn staleness_penalizes_after_first_day() {
        let last_success = now() - chrono::Duration::days(4);
        // 3 days past the 1-day grace period * 5 = 15
        assert_eq!(health_score(0, false, Some(last_success), now()), 85);
    }

    #[test]
    fn score_never_drops_below_zero() {
        assert_eq!(health_score(100, true, None, now()), 0);
    }
}
