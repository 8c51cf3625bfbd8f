//! Backlight controller
//!
//! Drives the panel backlight from one PWM channel. Intensity is a
//! percentage; the curve keeps the top of the range linear in duty steps
//! of `max_duty / 100` and pins 0% to a fully dark output.

use packview_hal::{PwmChannel, PwmController, PwmError, TimerConfig};

/// PWM timer used for the backlight: 5 kHz at 13-bit resolution
pub const BACKLIGHT_TIMER: TimerConfig = TimerConfig {
    frequency_hz: 5_000,
    resolution_bits: 13,
};

/// Intensity applied right after initialization
pub const DEFAULT_INTENSITY: u8 = 50;

/// Map an intensity percentage to a duty value
///
/// Values above 100 are treated as 100. Zero is exactly zero duty; any
/// other value is `max_duty - (max_duty / 100) * (100 - percent)`.
pub fn duty_for(percent: u8, max_duty: u32) -> u32 {
    let percent = u32::from(percent.min(100));
    if percent == 0 {
        return 0;
    }
    let step = max_duty / 100;
    max_duty - step * (100 - percent)
}

/// Dimmable backlight on a bound PWM channel
pub struct Backlight<C> {
    channel: C,
    intensity: u8,
}

impl<C: PwmChannel> Backlight<C> {
    /// Configure the line and timer, then bind a channel at zero duty
    ///
    /// The fade assist is enabled when available but never used; every
    /// intensity change is an immediate step.
    pub fn init<P>(pwm: &mut P, line: u8) -> Result<Self, PwmError>
    where
        P: PwmController<Channel = C>,
    {
        pwm.configure_output(line)?;
        pwm.configure_timer(&BACKLIGHT_TIMER)?;
        let channel = pwm.bind_channel(line, 0)?;
        pwm.install_fade()?;

        Ok(Self {
            channel,
            intensity: 0,
        })
    }

    /// Set intensity in percent and commit it to hardware immediately
    pub fn set_intensity(&mut self, percent: u8) -> Result<(), PwmError> {
        let percent = percent.min(100);
        let duty = duty_for(percent, self.channel.max_duty());
        self.channel.set_duty(duty)?;
        self.channel.update_duty()?;
        self.intensity = percent;
        Ok(())
    }

    /// Last applied intensity in percent
    pub fn intensity(&self) -> u8 {
        self.intensity
    }

    /// Duty value currently latched in hardware
    pub fn duty(&self) -> u32 {
        self.channel.duty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, Log, MockPwm};
    use core::cell::RefCell;

    const BL: u8 = 22;

    fn backlight(log: &Log) -> Backlight<crate::testing::MockChannel<'_>> {
        let mut pwm = MockPwm::new(log);
        match Backlight::init(&mut pwm, BL) {
            Ok(bl) => bl,
            Err(e) => panic!("init failed: {:?}", e),
        }
    }

    #[test]
    fn test_duty_curve_points() {
        assert_eq!(duty_for(0, 8191), 0);
        assert_eq!(duty_for(100, 8191), 8191);
        assert_eq!(duty_for(50, 8191), 8191 - 81 * 50);
        assert_eq!(duty_for(1, 8191), 8191 - 81 * 99);
    }

    #[test]
    fn test_clamp_above_hundred() {
        assert_eq!(duty_for(150, 8191), duty_for(100, 8191));
        assert_eq!(duty_for(255, 8191), 8191);
    }

    #[test]
    fn test_init_sequence() {
        let log = RefCell::new(heapless::Vec::new());
        let bl = backlight(&log);

        assert_eq!(bl.duty(), 0);
        assert_eq!(
            log.borrow().as_slice(),
            &[
                Event::PwmOutput(BL),
                Event::PwmTimer(BACKLIGHT_TIMER),
                Event::PwmBind { line: BL, duty: 0 },
                Event::PwmFade,
            ]
        );
    }

    #[test]
    fn test_set_intensity_commits_immediately() {
        let log = RefCell::new(heapless::Vec::new());
        let mut bl = backlight(&log);
        log.borrow_mut().clear();

        bl.set_intensity(50).ok();

        assert_eq!(bl.duty(), 8191 - 81 * 50);
        assert_eq!(bl.intensity(), 50);
        assert_eq!(
            log.borrow().as_slice(),
            &[Event::DutySet(8191 - 81 * 50), Event::DutyUpdate(8191 - 81 * 50)]
        );
    }

    #[test]
    fn test_zero_after_any_intensity_is_dark() {
        let log = RefCell::new(heapless::Vec::new());
        let mut bl = backlight(&log);

        for v in [1u8, 37, 99, 100, 200] {
            bl.set_intensity(v).ok();
            bl.set_intensity(0).ok();
            assert_eq!(bl.duty(), 0);
        }
    }

    #[test]
    fn test_clamped_intensity_is_recorded() {
        let log = RefCell::new(heapless::Vec::new());
        let mut bl = backlight(&log);

        bl.set_intensity(150).ok();
        assert_eq!(bl.intensity(), 100);
        assert_eq!(bl.duty(), 8191);
    }
}
