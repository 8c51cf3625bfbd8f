//! Backlight PWM on one RP2040 slice
//!
//! The slice and its output pin are bound at board setup; the controller
//! then only accepts that line. Frequency is set with the slice's
//! fractional divider from the 125 MHz system clock, resolution with TOP.

use embassy_rp::pwm::{Config, Pwm};
use fixed::types::extra::U4;
use fixed::FixedU16;
use packview_hal::{PwmChannel, PwmController, PwmError, TimerConfig};

/// System clock feeding the PWM slices
pub const SYS_CLOCK_HZ: u32 = 125_000_000;

/// Which output of the slice the backlight pin is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SliceOutput {
    A,
    B,
}

/// Divider in 12.4 fixed point for `frequency_hz` with `top + 1` counts
fn divider_bits(frequency_hz: u32, top: u16) -> Option<u16> {
    let counts = u64::from(frequency_hz) * (u64::from(top) + 1);
    if counts == 0 {
        return None;
    }
    let bits = u64::from(SYS_CLOCK_HZ) * 16 / counts;
    // Divider range is 1.0 ..= 255 + 15/16
    if !(16..=0xFFF).contains(&bits) {
        return None;
    }
    Some(bits as u16)
}

/// PWM controller for a single pre-wired slice
pub struct Rp2040Pwm<'d> {
    pwm: Option<Pwm<'d>>,
    line: u8,
    output: SliceOutput,
    config: Config,
    configured: bool,
}

impl<'d> Rp2040Pwm<'d> {
    /// Wrap a slice already routed to GPIO `line`
    pub fn new(pwm: Pwm<'d>, line: u8, output: SliceOutput) -> Self {
        Self {
            pwm: Some(pwm),
            line,
            output,
            config: Config::default(),
            configured: false,
        }
    }

    fn check_line(&self, line: u8) -> Result<(), PwmError> {
        if line == self.line {
            Ok(())
        } else {
            Err(PwmError::InvalidLine)
        }
    }
}

impl<'d> PwmController for Rp2040Pwm<'d> {
    type Channel = Rp2040PwmChannel<'d>;

    fn configure_output(&mut self, line: u8) -> Result<(), PwmError> {
        self.check_line(line)
    }

    fn configure_timer(&mut self, config: &TimerConfig) -> Result<(), PwmError> {
        if config.resolution_bits == 0 || config.resolution_bits > 16 {
            return Err(PwmError::InvalidTimer);
        }
        let top = config.max_duty() as u16;
        let bits = divider_bits(config.frequency_hz, top).ok_or(PwmError::InvalidTimer)?;

        self.config.top = top;
        self.config.divider = FixedU16::<U4>::from_bits(bits);
        self.configured = true;
        Ok(())
    }

    fn bind_channel(&mut self, line: u8, duty: u32) -> Result<Self::Channel, PwmError> {
        self.check_line(line)?;
        if !self.configured {
            return Err(PwmError::InvalidTimer);
        }
        if duty > u32::from(self.config.top) {
            return Err(PwmError::DutyOutOfRange);
        }
        let pwm = self.pwm.take().ok_or(PwmError::AlreadyBound)?;

        let mut channel = Rp2040PwmChannel {
            pwm,
            output: self.output,
            config: self.config.clone(),
            pending: duty,
            duty,
        };
        channel.apply();
        Ok(channel)
    }

    fn install_fade(&mut self) -> Result<(), PwmError> {
        // Compare writes are double-buffered by the slice; nothing to install
        Ok(())
    }
}

/// Bound backlight output
pub struct Rp2040PwmChannel<'d> {
    pwm: Pwm<'d>,
    output: SliceOutput,
    config: Config,
    pending: u32,
    duty: u32,
}

impl Rp2040PwmChannel<'_> {
    fn apply(&mut self) {
        let compare = self.duty as u16;
        match self.output {
            SliceOutput::A => self.config.compare_a = compare,
            SliceOutput::B => self.config.compare_b = compare,
        }
        self.pwm.set_config(&self.config);
    }
}

impl PwmChannel for Rp2040PwmChannel<'_> {
    fn max_duty(&self) -> u32 {
        u32::from(self.config.top)
    }

    fn set_duty(&mut self, duty: u32) -> Result<(), PwmError> {
        if duty > self.max_duty() {
            return Err(PwmError::DutyOutOfRange);
        }
        self.pending = duty;
        Ok(())
    }

    fn update_duty(&mut self) -> Result<(), PwmError> {
        self.duty = self.pending;
        self.apply();
        Ok(())
    }

    fn duty(&self) -> u32 {
        self.duty
    }
}
