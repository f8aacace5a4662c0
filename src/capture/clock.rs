//! Time source for countdowns.
//!
//! The sequencer never calls `thread::sleep` itself; it asks a [`Clock`]. Tests and
//! `--instant` runs use [`SimulatedClock`], which only records what was asked.

use std::sync::Mutex;
use std::time::Duration;

pub trait Clock {
    fn sleep(&self, duration: Duration);
}

/// Wall clock, blocks the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Records requested sleeps and returns immediately.
#[derive(Debug, Default)]
pub struct SimulatedClock {
    sleeps: Mutex<Vec<Duration>>,
}

impl SimulatedClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every sleep requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Total simulated time
    pub fn elapsed(&self) -> Duration {
        self.sleeps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .sum()
    }
}

impl Clock for SimulatedClock {
    fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(duration);
    }
}
