use core::cell::Cell;

use embassy_time::{block_for, Duration, Instant};

/// Millisecond time source polled by the engines.
pub trait Clock {
    /// Monotonically non-decreasing; wraps after ~49 days.
    fn now_ms(&self) -> u32;

    /// Busy wait used between start-up animation steps.
    fn delay_ms(&self, ms: u32);
}

impl<C: Clock> Clock for &C {
    fn now_ms(&self) -> u32 {
        (*self).now_ms()
    }

    fn delay_ms(&self, ms: u32) {
        (*self).delay_ms(ms)
    }
}

/// Clock backed by the embassy time driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }

    fn delay_ms(&self, ms: u32) {
        block_for(Duration::from_millis(ms as u64));
    }
}

/// A clock that only moves when told to. Delays advance it immediately.
#[derive(Debug, Default)]
pub struct ManualClock(Cell<u32>);

impl ManualClock {
    pub fn new(ms: u32) -> Self {
        Self(Cell::new(ms))
    }

    pub fn set(&self, ms: u32) {
        self.0.set(ms);
    }

    pub fn advance(&self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }

    fn delay_ms(&self, ms: u32) {
        self.advance(ms);
    }
}

#[cfg(test)]
#[path = "clock_test.rs"]
mod test;
