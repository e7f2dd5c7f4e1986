//! Periodic NAV-PVT / NAV-STATUS timing

use std::time::{Duration, Instant};

use tracing::debug;

use crate::ValidationError;

pub const MIN_RATE_HZ: u32 = 1;
pub const MAX_RATE_HZ: u32 = 50;

/// Decides when the next telemetry epoch is due.
///
/// Only the clock handed to [`poll_due`](Self::poll_due) moves it: an epoch
/// fires at most once per poll and missed epochs are skipped rather than
/// replayed in a burst.
#[derive(Debug, Clone)]
pub struct TelemetryScheduler {
    period: Duration,
    enabled: bool,
    running: bool,
    next_due: Option<Instant>,
}

impl Default for TelemetryScheduler {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
            enabled: true,
            running: false,
            next_due: None,
        }
    }
}

impl TelemetryScheduler {
    pub fn with_rate_hz(rate_hz: u32) -> Result<Self, ValidationError> {
        let mut scheduler = Self::default();
        scheduler.set_rate_hz(rate_hz)?;
        Ok(scheduler)
    }

    pub fn set_rate_hz(&mut self, rate_hz: u32) -> Result<(), ValidationError> {
        ValidationError::check_range(
            "telemetry",
            "rate",
            i64::from(rate_hz),
            i64::from(MIN_RATE_HZ),
            i64::from(MAX_RATE_HZ),
        )?;
        self.set_period(Duration::from_millis(1000 / u64::from(rate_hz)));
        Ok(())
    }

    /// Change the period; a running schedule keeps its next epoch
    pub fn set_period(&mut self, period: Duration) {
        if period.is_zero() {
            return;
        }
        debug!("Telemetry period set to {} ms", period.as_millis());
        self.period = period;
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// First epoch fires immediately
    pub fn start(&mut self, now: Instant) {
        self.running = true;
        self.next_due = Some(now);
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.next_due = None;
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due.filter(|_| self.running && self.enabled)
    }

    /// `true` when an epoch is due at `now`; the schedule moves to the next one
    pub fn poll_due(&mut self, now: Instant) -> bool {
        if !self.running || !self.enabled {
            return false;
        }
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }
        let mut next = due + self.period;
        if next <= now {
            next = now + self.period;
        }
        self.next_due = Some(next);
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fires_once_per_period() {
        let t0 = Instant::now();
        let mut s = TelemetryScheduler::with_rate_hz(5).unwrap();
        assert_eq!(s.period(), Duration::from_millis(200));
        assert!(!s.poll_due(t0));
        s.start(t0);
        assert!(s.poll_due(t0));
        assert!(!s.poll_due(t0 + Duration::from_millis(199)));
        assert!(s.poll_due(t0 + Duration::from_millis(200)));
        assert!(!s.poll_due(t0 + Duration::from_millis(250)));
    }

    #[test]
    fn no_burst_after_stall() {
        let t0 = Instant::now();
        let mut s = TelemetryScheduler::default();
        s.start(t0);
        assert!(s.poll_due(t0));
        let late = t0 + Duration::from_secs(10);
        assert!(s.poll_due(late));
        assert!(!s.poll_due(late));
        assert_eq!(s.next_due(), Some(late + Duration::from_secs(1)));
    }

    #[test]
    fn disabled_or_stopped_never_fires() {
        let t0 = Instant::now();
        let mut s = TelemetryScheduler::default();
        s.start(t0);
        s.set_enabled(false);
        assert!(!s.poll_due(t0));
        s.set_enabled(true);
        s.stop();
        assert!(!s.poll_due(t0 + Duration::from_secs(5)));
    }

    #[test]
    fn rate_range() {
        assert!(TelemetryScheduler::with_rate_hz(0).is_err());
        assert!(TelemetryScheduler::with_rate_hz(51).is_err());
        assert_eq!(
            TelemetryScheduler::with_rate_hz(50).unwrap().period(),
            Duration::from_millis(20)
        );
    }
}
