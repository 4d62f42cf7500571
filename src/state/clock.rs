//! Session clock: countdown for the active phase

use serde::{Deserialize, Serialize};

/// Countdown clock for the currently active session phase.
///
/// The clock only counts; it has no idea which phase it is timing. Phase
/// selection and durations belong to the sequencer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClock {
    pub remaining_seconds: u64,
    pub is_running: bool,
}

impl SessionClock {
    /// Create a stopped clock holding the given number of seconds
    pub fn new(seconds: u64) -> Self {
        Self {
            remaining_seconds: seconds,
            is_running: false,
        }
    }

    /// Start the clock. No-op if already running or already expired.
    pub fn start(&mut self) {
        if self.remaining_seconds > 0 {
            self.is_running = true;
        }
    }

    /// Pause the clock, preserving the remaining time exactly
    pub fn pause(&mut self) {
        self.is_running = false;
    }

    /// Reset the clock to the given duration and stop it.
    ///
    /// Negative durations are clamped to zero rather than rejected, so a
    /// clamped reset behaves like an already-expired phase.
    pub fn reset(&mut self, to_seconds: i64) {
        self.remaining_seconds = to_seconds.max(0) as u64;
        self.is_running = false;
    }

    /// Advance the clock by one second.
    ///
    /// Returns `true` exactly once: on the tick whose decrement reaches zero.
    /// That tick also stops the clock, so later ticks without an intervening
    /// `reset` are no-ops and the clock never goes negative.
    pub fn tick(&mut self) -> bool {
        if !self.is_running || self.remaining_seconds == 0 {
            return false;
        }

        self.remaining_seconds -= 1;

        if self.remaining_seconds == 0 {
            self.is_running = false;
            true
        } else {
            false
        }
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_counts_down_and_expires_once() {
        let mut clock = SessionClock::new(3);
        clock.start();

        assert!(!clock.tick());
        assert!(!clock.tick());
        assert!(clock.tick());
        assert_eq!(clock.remaining_seconds, 0);
        assert!(!clock.is_running);

        // A fourth tick after expiry must not fire or go negative
        assert!(!clock.tick());
        assert_eq!(clock.remaining_seconds, 0);
    }

    #[test]
    fn test_tick_is_noop_while_paused() {
        let mut clock = SessionClock::new(10);
        clock.start();
        clock.tick();
        clock.pause();

        assert!(!clock.tick());
        assert_eq!(clock.remaining_seconds, 9);
    }

    #[test]
    fn test_start_is_noop_when_expired() {
        let mut clock = SessionClock::new(1);
        clock.start();
        clock.tick();

        clock.start();
        assert!(!clock.is_running);
    }

    #[test]
    fn test_reset_clamps_negative_to_zero() {
        let mut clock = SessionClock::new(60);
        clock.start();

        clock.reset(-5);
        assert_eq!(clock.remaining_seconds, 0);
        assert!(!clock.is_running);
    }

    #[test]
    fn test_reset_stops_and_reloads() {
        let mut clock = SessionClock::new(60);
        clock.start();
        clock.tick();

        clock.reset(300);
        assert_eq!(clock.remaining_seconds, 300);
        assert!(!clock.is_running);
    }
}
