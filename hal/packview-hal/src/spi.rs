//! SPI bus abstractions
//!
//! The display sits alone on a write-only SPI bus. A host hands out a
//! device handle bound to a clock rate and an optional chip-select line;
//! the handle issues whole transactions and is given back on teardown.

/// SPI device handle
///
/// One `transmit` call is one bus transaction: chip-select asserted for
/// exactly `data.len() * 8` clocks, then released.
pub trait SpiDevice {
    /// Transmit `data` in a single blocking transaction
    fn transmit(&mut self, data: &[u8]) -> Result<(), SpiError>;
}

/// SPI bus master that devices are attached to
pub trait SpiHost {
    /// Chip-select pin type accepted by [`SpiHost::add_device`]
    type Cs;
    /// Device handle returned on attachment
    type Device: SpiDevice;

    /// Attach a device to the bus
    fn add_device(&mut self, config: &DeviceConfig, cs: Option<Self::Cs>) -> Result<Self::Device, SpiError>;

    /// Detach a device and release its bus resources
    fn remove_device(&mut self, device: Self::Device);
}

/// Errors from SPI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiError {
    /// Bus is already bound to another device
    Busy,
    /// Requested clock cannot be generated
    InvalidClock,
    /// Transaction longer than the host can carry
    TooLong,
    /// Peripheral reported a transfer failure
    Transfer,
}

impl SpiError {
    /// Numeric code used in diagnostics
    pub fn code(self) -> i32 {
        match self {
            SpiError::Busy => 1,
            SpiError::InvalidClock => 2,
            SpiError::TooLong => 3,
            SpiError::Transfer => 4,
        }
    }
}

/// Device attachment parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Clock frequency in Hz
    pub clock_hz: u32,
    /// Clock polarity and phase
    pub mode: Mode,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            clock_hz: 1_000_000, // 1 MHz
            mode: Mode::Mode0,
        }
    }
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}
