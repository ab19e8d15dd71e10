//! Circuit breaker (§4.F).
//!
//! One breaker per dependency (vector store, graph store). Uses
//! `parking_lot::Mutex` for the shared state machine, the same primitive the
//! teacher uses in `lazy::cache`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    half_open_probe_in_flight: bool,
}

/// Per-dependency circuit breaker.
///
/// `Closed` lets calls through, counting consecutive failures.
/// `Open` short-circuits every call until `cooldown` has elapsed, then
/// allows exactly one probe call through as `HalfOpen`. Success from that
/// probe resets to `Closed`; failure reopens with a fresh cooldown.
pub struct CircuitBreaker {
    failure_threshold: u32,
    cooldown: Duration,
    inner: Mutex<Inner>,
    trips: AtomicU32,
}

/// What the caller should do, decided by the breaker before it invokes the
/// protected function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Proceed with the call normally.
    Allowed,
    /// Proceed with the call, but it is the single `HalfOpen` probe: report
    /// the outcome via `record_success`/`record_failure`.
    Probe,
    /// Do not call the dependency; short-circuit with `DependencyUnavailable`.
    Rejected,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            cooldown,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                half_open_probe_in_flight: false,
            }),
            trips: AtomicU32::new(0),
        }
    }

    pub fn state(&self) -> BreakerState {
        let mut inner = self.inner.lock();
        self.maybe_transition_to_half_open(&mut inner);
        inner.state
    }

    fn maybe_transition_to_half_open(&self, inner: &mut Inner) {
        if inner.state == BreakerState::Open {
            if let Some(opened_at) = inner.opened_at {
                if opened_at.elapsed() >= self.cooldown {
                    inner.state = BreakerState::HalfOpen;
                    inner.half_open_probe_in_flight = false;
                }
            }
        }
    }

    /// Decide whether a call may proceed.
    pub fn admit(&self) -> Admission {
        let mut inner = self.inner.lock();
        self.maybe_transition_to_half_open(&mut inner);
        match inner.state {
            BreakerState::Closed => Admission::Allowed,
            BreakerState::Open => Admission::Rejected,
            BreakerState::HalfOpen => {
                if inner.half_open_probe_in_flight {
                    Admission::Rejected
                } else {
                    inner.half_open_probe_in_flight = true;
                    Admission::Probe
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        inner.state = BreakerState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
        inner.half_open_probe_in_flight = false;
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            BreakerState::HalfOpen => {
                inner.state = BreakerState::Open;
                inner.opened_at = Some(Instant::now());
                inner.half_open_probe_in_flight = false;
                self.trips.fetch_add(1, Ordering::Relaxed);
            }
            BreakerState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.failure_threshold {
                    inner.state = BreakerState::Open;
                    inner.opened_at = Some(Instant::now());
                    self.trips.fetch_add(1, Ordering::Relaxed);
                }
            }
            BreakerState::Open => {
                inner.opened_at = Some(Instant::now());
            }
        }
    }

    pub fn trip_count(&self) -> u32 {
        self.trips.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_consecutive_failures() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(60));
        for _ in 0..2 {
            assert_eq!(breaker.admit(), Admission::Allowed);
            breaker.record_failure();
        }
        assert_eq!(breaker.state(), BreakerState::Closed);
        breaker.admit();
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
        assert_eq!(breaker.admit(), Admission::Rejected);
    }

    #[test]
    fn half_open_probe_then_close_on_success() {
        let breaker = CircuitBreaker::new(1, Duration::from_millis(10));
        breaker.admit();
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(breaker.admit(), Admission::Probe);
        // a second concurrent caller must not also get the probe
        assert_eq!(breaker.admit(), Admission::Rejected);

        breaker.record_success();
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[test]
    fn half_open_probe_failure_reopens_with_fresh_cooldown() {
        let breaker = CircuitBreaker::new(1, Duration::from_millis(10));
        breaker.admit();
        breaker.record_failure();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(breaker.admit(), Admission::Probe);
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
        assert_eq!(breaker.admit(), Admission::Rejected);
    }

    #[test]
    fn success_resets_failure_counter() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(60));
        breaker.admit();
        breaker.record_failure();
        breaker.admit();
        breaker.record_success();
        breaker.admit();
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Closed);
    }
}
