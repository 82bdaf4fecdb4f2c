//! Circuit breaker: per-endpoint closed/open/half-open state. Process-wide,
//! shared by every worker targeting an endpoint, behind a single lock.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use travelclick_domain::{CircuitState, CircuitStateValue};

/// Outcome of asking the breaker whether a call may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    /// Open and the reset timeout hasn't elapsed yet.
    Rejected,
}

pub struct CircuitBreaker {
    failure_threshold: u32,
    reset_timeout: chrono::Duration,
    states: Mutex<HashMap<String, CircuitState>>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, reset_timeout: chrono::Duration) -> Self {
        Self {
            failure_threshold,
            reset_timeout,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// May a call to `endpoint` proceed right now? Transitions Open→HalfOpen
    /// as a side effect once the reset timeout has elapsed.
    pub fn admit(&self, endpoint: &str) -> Admission {
        let mut states = self.states.lock().expect("circuit breaker lock poisoned");
        let state = states.entry(endpoint.to_string()).or_default();

        match state.state {
            CircuitStateValue::Closed => Admission::Allowed,
            CircuitStateValue::HalfOpen => Admission::Allowed,
            CircuitStateValue::Open => {
                let elapsed = state
                    .opened_at
                    .map(|opened| Utc::now() - opened)
                    .unwrap_or(chrono::Duration::zero());
                if elapsed >= self.reset_timeout {
                    state.state = CircuitStateValue::HalfOpen;
                    Admission::Allowed
                } else {
                    Admission::Rejected
                }
            }
        }
    }

    /// Record a successful call. In Closed this resets the failure counter;
    /// in HalfOpen (the single probe) it closes the circuit.
    pub fn record_success(&self, endpoint: &str) {
        let mut states = self.states.lock().expect("circuit breaker lock poisoned");
        let state = states.entry(endpoint.to_string()).or_default();
        state.state = CircuitStateValue::Closed;
        state.consecutive_failures = 0;
        state.opened_at = None;
    }

    /// Record a failed call. In HalfOpen, the probe failing re-opens the
    /// circuit and restarts the reset timer. In Closed, the circuit opens
    /// once consecutive failures reach the threshold.
    pub fn record_failure(&self, endpoint: &str) {
        let mut states = self.states.lock().expect("circuit breaker lock poisoned");
        let state = states.entry(endpoint.to_string()).or_default();
        match state.state {
            CircuitStateValue::HalfOpen => {
                state.state = CircuitStateValue::Open;
                state.opened_at = Some(Utc::now());
            }
            CircuitStateValue::Closed => {
                state.consecutive_failures += 1;
                if state.consecutive_failures >= self.failure_threshold {
                    state.state = CircuitStateValue::Open;
                    state.opened_at = Some(Utc::now());
                }
            }
            CircuitStateValue::Open => {}
        }
    }

    pub fn state_of(&self, endpoint: &str) -> CircuitState {
        let mut states = self.states.lock().expect("circuit breaker lock poisoned");
        states.entry(endpoint.to_string()).or_default().clone()
    }

    /// Time remaining before an Open circuit allows a half-open probe.
    /// `None` when the circuit isn't Open or has no recorded open time
    /// (callers should fall back to their own default requeue delay).
    pub fn remaining_reset(&self, endpoint: &str) -> Option<chrono::Duration> {
        let mut states = self.states.lock().expect("circuit breaker lock poisoned");
        let state = states.entry(endpoint.to_string()).or_default();
        if state.state != CircuitStateValue::Open {
            return None;
        }
        let opened_at = state.opened_at?;
        let remaining = self.reset_timeout - (Utc::now() - opened_at);
        Some(if remaining > chrono::Duration::zero() {
            remaining
        } else {
            chrono::Duration::zero()
        })
    }
}

impl Default for CircuitBreaker {
    /// Threshold 5, reset timeout 60s.
    fn default() -> Self {
        Self::new(5, chrono::Duration::seconds(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_threshold_consecutive_failures() {
        let breaker = CircuitBreaker::new(3, chrono::Duration::seconds(60));
        for _ in 0..2 {
            breaker.record_failure("https://crs.example.com");
            assert_eq!(breaker.admit("https://crs.example.com"), Admission::Allowed);
        }
        breaker.record_failure("https://crs.example.com");
        assert_eq!(breaker.admit("https://crs.example.com"), Admission::Rejected);
    }

    #[test]
    fn success_in_closed_resets_counter() {
        let breaker = CircuitBreaker::new(3, chrono::Duration::seconds(60));
        breaker.record_failure("ep");
        breaker.record_failure("ep");
        breaker.record_success("ep");
        assert_eq!(breaker.state_of("ep").consecutive_failures, 0);
    }

    #[test]
    fn half_open_probe_failure_reopens_and_restarts_timer() {
        let breaker = CircuitBreaker::new(1, chrono::Duration::seconds(0));
        breaker.record_failure("ep");
        assert_eq!(breaker.admit("ep"), Admission::Allowed);
        breaker.record_failure("ep");
        assert_eq!(breaker.state_of("ep").state, CircuitStateValue::Open);
    }

    #[test]
    fn half_open_probe_success_closes_circuit() {
        let breaker = CircuitBreaker::new(1, chrono::Duration::seconds(0));
        breaker.record_failure("ep");
        assert_eq!(breaker.admit("ep"), Admission::Allowed);
        breaker.record_success("ep");
        assert_eq!(breaker.state_of("ep").state, CircuitStateValue::Closed);
    }

    #[test]
    fn remaining_reset_is_none_when_not_open() {
        let breaker = CircuitBreaker::new(3, chrono::Duration::seconds(60));
        assert_eq!(breaker.remaining_reset("ep"), None);
    }

    #[test]
    fn remaining_reset_counts_down_from_reset_timeout() {
        let breaker = CircuitBreaker::new(1, chrono::Duration::seconds(60));
        breaker.record_failure("ep");
        let remaining = breaker.remaining_reset("ep").expect("circuit is open");
        assert!(remaining > chrono::Duration::zero());
        assert!(remaining <= chrono::Duration::seconds(60));
    }
}
