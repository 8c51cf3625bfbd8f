//! PWM abstractions
//!
//! Modelled on timer/channel PWM peripherals: a timer sets frequency and
//! duty resolution, a channel routes one timer to an output line and
//! holds the compare value. Duty writes are staged by `set_duty` and
//! latched by `update_duty`.

/// Errors from PWM operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmError {
    /// Line cannot be driven by this controller
    InvalidLine,
    /// Frequency/resolution combination is not achievable
    InvalidTimer,
    /// Channel was already bound
    AlreadyBound,
    /// Duty value exceeds the configured resolution
    DutyOutOfRange,
}

/// PWM timer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerConfig {
    /// Output frequency in Hz
    pub frequency_hz: u32,
    /// Duty resolution in bits
    pub resolution_bits: u8,
}

impl TimerConfig {
    /// Largest duty value at this resolution
    pub fn max_duty(&self) -> u32 {
        match self.resolution_bits {
            0 => 0,
            bits @ 1..=31 => (1u32 << bits) - 1,
            _ => u32::MAX,
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 5_000,
            resolution_bits: 13,
        }
    }
}

/// One bound PWM output
pub trait PwmChannel {
    /// Largest accepted duty value
    fn max_duty(&self) -> u32;

    /// Stage a new compare value
    fn set_duty(&mut self, duty: u32) -> Result<(), PwmError>;

    /// Latch the staged compare value into hardware
    fn update_duty(&mut self) -> Result<(), PwmError>;

    /// Currently latched duty value
    fn duty(&self) -> u32;
}

/// PWM peripheral that hands out channels
pub trait PwmController {
    /// Channel type returned by [`PwmController::bind_channel`]
    type Channel: PwmChannel;

    /// Route `line` as a PWM-capable output
    fn configure_output(&mut self, line: u8) -> Result<(), PwmError>;

    /// Configure the timer shared by this controller's channels
    fn configure_timer(&mut self, config: &TimerConfig) -> Result<(), PwmError>;

    /// Bind a channel to `line` starting at `duty`
    fn bind_channel(&mut self, line: u8, duty: u32) -> Result<Self::Channel, PwmError>;

    /// Enable the hardware fade assist, if the chip has one
    fn install_fade(&mut self) -> Result<(), PwmError>;
}
