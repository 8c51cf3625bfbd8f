//! GPIO pin abstractions
//!
//! Provides traits for digital output pins that can be implemented
//! by chip-specific HALs. Pins are requested by line number so board
//! wiring can be described as plain data.

/// Logic level of a digital line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    Low,
    /// Logic 1
    High,
}

/// Errors from GPIO configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioError {
    /// Line number does not exist on this chip
    InvalidLine,
    /// Line was already handed out
    AlreadyTaken,
}

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;
}

/// Source of output pins addressed by line number
pub trait OutputBank {
    /// Pin type handed out by this bank
    type Pin: OutputPin;

    /// Configure `line` as a push-pull output driven to `initial`
    fn output(&mut self, line: u8, initial: Level) -> Result<Self::Pin, GpioError>;
}
