//! Timing primitives backed by the embassy time driver

use embassy_time::{block_for, Duration, Instant};
use packview_hal::DelayMs;

/// Busy-wait for `ms` milliseconds
///
/// Used where the caller cannot yield, such as the reset sequence and
/// the graphics engine's delay hook.
pub fn block_ms(ms: u32) {
    block_for(Duration::from_millis(u64::from(ms)));
}

/// Milliseconds since boot, wrapping at `u32::MAX`
pub fn uptime_ms() -> u32 {
    Instant::now().as_millis() as u32
}

/// Blocking delay provider
#[derive(Debug, Default, Clone, Copy)]
pub struct Rp2040Delay;

impl DelayMs for Rp2040Delay {
    fn delay_ms(&mut self, ms: u32) {
        block_ms(ms);
    }
}
