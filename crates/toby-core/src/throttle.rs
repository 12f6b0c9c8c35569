//! Reminder throttling and quiet hours.

use std::time::{Duration, Instant};

use crate::{errors::Error, Result};

// ============== Notification Throttle ==============

/// Observable state of the throttle at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThrottleState {
    /// Nothing sent yet, or the interval has passed.
    Idle,
    /// A notification went out less than one interval ago.
    Throttled { remaining: Duration },
}

/// Enforces a minimum spacing between reminder notifications.
#[derive(Clone, Debug)]
pub struct NotificationThrottle {
    interval: Duration,
    last_notified_at: Option<Instant>,
}

impl NotificationThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_notified_at: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_notified_at(&self) -> Option<Instant> {
        self.last_notified_at
    }

    pub fn should_notify(&self) -> bool {
        self.should_notify_at(Instant::now())
    }

    pub fn should_notify_at(&self, now: Instant) -> bool {
        matches!(self.state_at(now), ThrottleState::Idle)
    }

    pub fn state_at(&self, now: Instant) -> ThrottleState {
        let Some(last) = self.last_notified_at else {
            return ThrottleState::Idle;
        };

        let elapsed = now.saturating_duration_since(last);
        if elapsed > self.interval {
            ThrottleState::Idle
        } else {
            ThrottleState::Throttled {
                remaining: self.interval - elapsed,
            }
        }
    }

    pub fn mark_notified(&mut self) -> Result<()> {
        self.mark_notified_at(Instant::now())
    }

    /// Record a sent notification. Marking while still throttled is a
    /// scheduling bug and is rejected rather than silently accepted.
    pub fn mark_notified_at(&mut self, now: Instant) -> Result<()> {
        if let ThrottleState::Throttled { remaining } = self.state_at(now) {
            return Err(Error::InvalidState(format!(
                "already notified, throttled for another {}s",
                remaining.as_secs()
            )));
        }
        self.last_notified_at = Some(now);
        Ok(())
    }
}

// ============== Quiet Hours ==============

/// Local-time window (whole hours, inclusive) during which reminders are muted.
///
/// `start > end` wraps past midnight, e.g. `22-6`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuietHours {
    start: u32,
    end: u32,
}

impl QuietHours {
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start > 23 || end > 23 {
            return Err(Error::Config(format!(
                "quiet hours must be within 0-23, got {start}-{end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn contains(&self, hour: u32) -> bool {
        if self.start <= self.end {
            self.start <= hour && hour <= self.end
        } else {
            hour >= self.start || hour <= self.end
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(30 * 60);

    #[test]
    fn fresh_throttle_is_idle() {
        let t = NotificationThrottle::new(INTERVAL);
        let now = Instant::now();
        assert!(t.should_notify_at(now));
        assert_eq!(t.state_at(now), ThrottleState::Idle);
        assert!(t.last_notified_at().is_none());
    }

    #[test]
    fn throttled_until_interval_strictly_elapses() {
        let start = Instant::now();
        let mut t = NotificationThrottle::new(INTERVAL);
        t.mark_notified_at(start).unwrap();

        assert!(!t.should_notify_at(start));
        assert!(!t.should_notify_at(start + INTERVAL - Duration::from_secs(1)));
        assert!(!t.should_notify_at(start + INTERVAL));
        assert!(t.should_notify_at(start + INTERVAL + Duration::from_millis(1)));
    }

    #[test]
    fn reports_remaining_time_while_throttled() {
        let start = Instant::now();
        let mut t = NotificationThrottle::new(INTERVAL);
        t.mark_notified_at(start).unwrap();

        assert_eq!(
            t.state_at(start + Duration::from_secs(10 * 60)),
            ThrottleState::Throttled {
                remaining: Duration::from_secs(20 * 60)
            }
        );
    }

    #[test]
    fn double_mark_is_invalid_state() {
        let start = Instant::now();
        let mut t = NotificationThrottle::new(INTERVAL);
        t.mark_notified_at(start).unwrap();

        let err = t
            .mark_notified_at(start + Duration::from_secs(60))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert_eq!(t.last_notified_at(), Some(start));
    }

    #[test]
    fn mark_again_after_interval() {
        let start = Instant::now();
        let later = start + INTERVAL + Duration::from_secs(1);
        let mut t = NotificationThrottle::new(INTERVAL);
        t.mark_notified_at(start).unwrap();
        t.mark_notified_at(later).unwrap();
        assert_eq!(t.last_notified_at(), Some(later));
        assert!(!t.should_notify_at(later));
    }

    #[test]
    fn quiet_hours_inclusive_bounds() {
        let q = QuietHours::new(5, 8).unwrap();
        assert!(!q.contains(4));
        assert!(q.contains(5));
        assert!(q.contains(8));
        assert!(!q.contains(9));
    }

    #[test]
    fn quiet_hours_wrap_midnight() {
        let q = QuietHours::new(22, 6).unwrap();
        assert!(q.contains(23));
        assert!(q.contains(0));
        assert!(q.contains(6));
        assert!(!q.contains(7));
        assert!(!q.contains(21));
    }

    #[test]
    fn quiet_hours_reject_out_of_range() {
        assert!(QuietHours::new(24, 1).is_err());
        assert!(QuietHours::new(1, 24).is_err());
    }
}
