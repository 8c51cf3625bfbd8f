//! Output pins by line number
//!
//! The firmware moves the pins it wants to drive dynamically into a
//! [`PinBank`]; drivers then ask for them by GPIO number.

use embassy_rp::gpio::{AnyPin, Level as RpLevel, Output};
use embassy_rp::Peri;
use packview_hal::{GpioError, Level, OutputBank, OutputPin};

/// Number of GPIO lines on RP2040
pub const GPIO_COUNT: usize = 30;

/// Pins available for runtime assignment
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

impl Default for PinBank {
    fn default() -> Self {
        Self::new()
    }
}

impl PinBank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self {
            pins: [const { None }; GPIO_COUNT],
        }
    }

    /// Put a pin into the bank under its GPIO number
    pub fn insert(&mut self, line: u8, pin: Peri<'static, AnyPin>) -> Result<(), GpioError> {
        let slot = self
            .pins
            .get_mut(line as usize)
            .ok_or(GpioError::InvalidLine)?;
        if slot.is_some() {
            return Err(GpioError::AlreadyTaken);
        }
        *slot = Some(pin);
        Ok(())
    }

    /// Take a pin by number
    pub fn take(&mut self, line: u8) -> Result<Peri<'static, AnyPin>, GpioError> {
        self.pins
            .get_mut(line as usize)
            .ok_or(GpioError::InvalidLine)?
            .take()
            .ok_or(GpioError::AlreadyTaken)
    }
}

impl OutputBank for PinBank {
    type Pin = Rp2040Output;

    fn output(&mut self, line: u8, initial: Level) -> Result<Self::Pin, GpioError> {
        let pin = self.take(line)?;
        let level = match initial {
            Level::Low => RpLevel::Low,
            Level::High => RpLevel::High,
        };
        Ok(Rp2040Output {
            output: Output::new(pin, level),
        })
    }
}

/// Push-pull output taken from a [`PinBank`]
pub struct Rp2040Output {
    output: Output<'static>,
}

impl OutputPin for Rp2040Output {
    fn set_high(&mut self) {
        self.output.set_high();
    }

    fn set_low(&mut self) {
        self.output.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.output.is_set_high()
    }
}
