// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Session tick clock.
//!
//! Produces one tick per interval against a monotonic deadline. Each tick
//! moves the deadline forward by exactly one interval (`next += interval`)
//! instead of re-arming a relative delay, so scheduling latency does not
//! accumulate over long sessions.

use tokio::time::{Duration, Instant};

/// Default spacing between ticks
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Clock state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Running,
    Paused,
}

/// Deadline-based tick source
#[derive(Debug, Clone)]
pub struct TickClock {
    /// Spacing between ticks
    interval: Duration,
    /// Current clock state
    state: ClockState,
    /// When the next tick is due, only set while running
    next_tick: Option<Instant>,
}

impl TickClock {
    /// Create a stopped clock; a zero interval falls back to [`TICK_INTERVAL`]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: if interval.is_zero() { TICK_INTERVAL } else { interval },
            state: ClockState::Stopped,
            next_tick: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Start from zero; the first tick is due one interval after `now`
    pub fn start(&mut self, now: Instant) {
        self.state = ClockState::Running;
        self.next_tick = Some(now + self.interval);
    }

    /// Stop and forget the pending deadline
    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
        self.next_tick = None;
    }

    /// Freeze; no deadline is pending while paused
    pub fn pause(&mut self) {
        if self.state == ClockState::Running {
            self.state = ClockState::Paused;
            self.next_tick = None;
        }
    }

    /// Continue from pause; the next tick is a full interval after `now`
    pub fn resume(&mut self, now: Instant) {
        if self.state == ClockState::Paused {
            self.state = ClockState::Running;
            self.next_tick = Some(now + self.interval);
        }
    }

    /// When the next tick is due, if running
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            ClockState::Running => self.next_tick,
            _ => None,
        }
    }

    /// Consume a tick if one is due at `now`.
    ///
    /// Returns true when a tick fired. The deadline advances by one interval
    /// from its previous value, not from `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(due) if now >= due => {
                self.next_tick = Some(due + self.interval);
                true
            }
            _ => false,
        }
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_creation() {
        let clock = TickClock::default();
        assert_eq!(clock.interval(), Duration::from_secs(1));
        assert_eq!(clock.state(), ClockState::Stopped);
        assert_eq!(clock.deadline(), None);
    }

    #[test]
    fn test_zero_interval_falls_back() {
        let clock = TickClock::new(Duration::ZERO);
        assert_eq!(clock.interval(), TICK_INTERVAL);
    }

    #[test]
    fn test_clock_start_stop() {
        let now = Instant::now();
        let mut clock = TickClock::default();

        clock.start(now);
        assert_eq!(clock.state(), ClockState::Running);
        assert_eq!(clock.deadline(), Some(now + Duration::from_secs(1)));

        clock.stop();
        assert_eq!(clock.state(), ClockState::Stopped);
        assert_eq!(clock.deadline(), None);
        assert!(!clock.poll(now + Duration::from_secs(5)));
    }

    #[test]
    fn test_deadline_does_not_drift() {
        let start = Instant::now();
        let mut clock = TickClock::default();
        clock.start(start);

        // Each poll arrives 30ms late; deadlines stay on whole seconds
        for n in 1..=10u32 {
            let late = start + Duration::from_secs(n as u64) + Duration::from_millis(30);
            assert!(clock.poll(late));
            assert_eq!(
                clock.deadline(),
                Some(start + Duration::from_secs(n as u64 + 1))
            );
        }
    }

    #[test]
    fn test_poll_before_deadline() {
        let start = Instant::now();
        let mut clock = TickClock::default();
        clock.start(start);

        assert!(!clock.poll(start + Duration::from_millis(999)));
        assert!(clock.poll(start + Duration::from_millis(1000)));
        assert!(!clock.poll(start + Duration::from_millis(1500)));
    }

    #[test]
    fn test_clock_pause_resume() {
        let start = Instant::now();
        let mut clock = TickClock::default();
        clock.start(start);

        clock.pause();
        assert_eq!(clock.state(), ClockState::Paused);
        assert_eq!(clock.deadline(), None);
        assert!(!clock.poll(start + Duration::from_secs(10)));

        let resumed = start + Duration::from_secs(10);
        clock.resume(resumed);
        assert_eq!(clock.state(), ClockState::Running);
        assert_eq!(clock.deadline(), Some(resumed + Duration::from_secs(1)));
    }

    #[test]
    fn test_resume_only_from_pause() {
        let now = Instant::now();
        let mut clock = TickClock::default();
        clock.resume(now);
        assert_eq!(clock.state(), ClockState::Stopped);
    }
}
