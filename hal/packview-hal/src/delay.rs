//! Blocking delay abstraction
//!
//! The display reset pulse needs minimum hold times between line changes.
//! Everything runs from one cooperative loop, so a blocking wait is fine.

/// Blocking millisecond delay
pub trait DelayMs {
    /// Block for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

impl<T: DelayMs + ?Sized> DelayMs for &mut T {
    fn delay_ms(&mut self, ms: u32) {
        T::delay_ms(self, ms)
    }
}
