//! Per-cluster frame scheduler and host time sources.
//!
//! Each cluster slot keeps its own last-run timestamp. A slot is due when at
//! least its `animation_speed_ms` has elapsed; slots never wait on each other.
//! Elapsed time uses wrapping subtraction so a rolled-over millisecond
//! counter still makes progress.

use crate::descriptor::MAX_CLUSTERS;

/// A millisecond time source.
pub trait Clock {
    /// Current time in milliseconds. Only differences are meaningful.
    fn now_ms(&self) -> u64;
}

impl<F: Fn() -> u64> Clock for F {
    fn now_ms(&self) -> u64 {
        self()
    }
}

/// Wall clock measuring milliseconds since construction.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Start a clock at 0 ms.
    pub fn new() -> Self {
        Self { origin: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Per-slot rate limiter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameScheduler {
    last_update: [u64; MAX_CLUSTERS],
}

impl FrameScheduler {
    /// All timers at 0.
    pub const fn new() -> Self {
        Self { last_update: [0; MAX_CLUSTERS] }
    }

    /// Reset all timers to 0.
    pub fn reset(&mut self) {
        self.last_update = [0; MAX_CLUSTERS];
    }

    /// If slot `index` is due at `now_ms`, record the run and return `true`.
    ///
    /// Out-of-range slots are never due.
    pub fn try_run(&mut self, index: usize, period_ms: u16, now_ms: u64) -> bool {
        let Some(last) = self.last_update.get_mut(index) else {
            return false;
        };
        if now_ms.wrapping_sub(*last) < period_ms as u64 {
            return false;
        }
        *last = now_ms;
        true
    }

    /// Timestamp of the last run of slot `index` (0 if never run since reset).
    pub fn last_update(&self, index: usize) -> Option<u64> {
        self.last_update.get(index).copied()
    }
}
