//! System clock adapter.
//!
//! Monotonic time comes from [`Instant`], wall-clock seconds from
//! [`SystemTime`].  A wall clock before the epoch (unset RTC, no NTP yet)
//! reads as zero rather than failing the cycle.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::app::ports::TimePort;

pub struct SystemTimeAdapter {
    start: Instant,
}

impl Default for SystemTimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemTimeAdapter {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl TimePort for SystemTimeAdapter {
    fn monotonic_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn unix_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }

    fn sleep_ms(&mut self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}
