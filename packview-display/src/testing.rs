//! Recording mocks shared by the unit tests
//!
//! Every mock appends to one event log so tests can assert the exact
//! interleaving of line changes, delays, transactions and engine calls.

use core::cell::RefCell;

use packview_hal::{
    DelayMs, DeviceConfig, GpioError, Level, OutputBank, OutputPin, PwmChannel, PwmController,
    PwmError, SpiDevice, SpiError, SpiHost, TimerConfig,
};

use crate::controller::Controller;
use crate::dispatch::AdapterId;
use crate::engine::{DisplayId, FlushNotifier, GraphicsEngine, RenderMode, Rotation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Configure { line: u8, level: Level },
    Pin { line: u8, level: Level },
    Delay(u32),
    Attach { clock_hz: u32, cs: Option<u8> },
    Detach,
    Tx { len: usize, first: u8 },
    TxFailed { len: usize },
    FlushReady(DisplayId),
    PwmOutput(u8),
    PwmTimer(TimerConfig),
    PwmBind { line: u8, duty: u32 },
    PwmFade,
    DutySet(u32),
    DutyUpdate(u32),
    DelayHook,
    TickHook,
    EngineInit,
    TickInc(u32),
    CreateDisplay(Controller),
    Invert(bool),
    Rotate(Rotation),
    Buffers { len: usize, mode: RenderMode },
    UserData(AdapterId),
}

pub type Log = RefCell<heapless::Vec<Event, 64>>;

fn record(log: &Log, event: Event) {
    let _ = log.borrow_mut().push(event);
}

pub struct MockPin<'a> {
    log: &'a Log,
    pub line: u8,
    high: bool,
}

impl<'a> MockPin<'a> {
    pub fn new(log: &'a Log, line: u8, high: bool) -> Self {
        Self { log, line, high }
    }
}

impl OutputPin for MockPin<'_> {
    fn set_high(&mut self) {
        self.high = true;
        record(self.log, Event::Pin { line: self.line, level: Level::High });
    }

    fn set_low(&mut self) {
        self.high = false;
        record(self.log, Event::Pin { line: self.line, level: Level::Low });
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

pub struct MockGpio<'a> {
    log: &'a Log,
    pub fail_line: Option<u8>,
}

impl<'a> MockGpio<'a> {
    pub fn new(log: &'a Log) -> Self {
        Self { log, fail_line: None }
    }
}

impl<'a> OutputBank for MockGpio<'a> {
    type Pin = MockPin<'a>;

    fn output(&mut self, line: u8, initial: Level) -> Result<Self::Pin, GpioError> {
        if self.fail_line == Some(line) {
            return Err(GpioError::InvalidLine);
        }
        record(self.log, Event::Configure { line, level: initial });
        Ok(MockPin::new(self.log, line, initial == Level::High))
    }
}

pub struct MockDevice<'a> {
    log: &'a Log,
    fail: bool,
}

impl<'a> MockDevice<'a> {
    pub fn new(log: &'a Log, fail: bool) -> Self {
        Self { log, fail }
    }
}

impl SpiDevice for MockDevice<'_> {
    fn transmit(&mut self, data: &[u8]) -> Result<(), SpiError> {
        if self.fail {
            record(self.log, Event::TxFailed { len: data.len() });
            return Err(SpiError::Transfer);
        }
        record(self.log, Event::Tx { len: data.len(), first: data[0] });
        Ok(())
    }
}

pub struct MockHost<'a> {
    log: &'a Log,
    pub fail_attach: bool,
    pub fail_tx: bool,
}

impl<'a> MockHost<'a> {
    pub fn new(log: &'a Log) -> Self {
        Self {
            log,
            fail_attach: false,
            fail_tx: false,
        }
    }
}

impl<'a> SpiHost for MockHost<'a> {
    type Cs = MockPin<'a>;
    type Device = MockDevice<'a>;

    fn add_device(&mut self, config: &DeviceConfig, cs: Option<Self::Cs>) -> Result<Self::Device, SpiError> {
        if self.fail_attach {
            return Err(SpiError::Busy);
        }
        record(
            self.log,
            Event::Attach {
                clock_hz: config.clock_hz,
                cs: cs.map(|pin| pin.line),
            },
        );
        Ok(MockDevice::new(self.log, self.fail_tx))
    }

    fn remove_device(&mut self, _device: Self::Device) {
        record(self.log, Event::Detach);
    }
}

pub struct MockChannel<'a> {
    log: &'a Log,
    max: u32,
    staged: u32,
    latched: u32,
}

impl PwmChannel for MockChannel<'_> {
    fn max_duty(&self) -> u32 {
        self.max
    }

    fn set_duty(&mut self, duty: u32) -> Result<(), PwmError> {
        if duty > self.max {
            return Err(PwmError::DutyOutOfRange);
        }
        self.staged = duty;
        record(self.log, Event::DutySet(duty));
        Ok(())
    }

    fn update_duty(&mut self) -> Result<(), PwmError> {
        self.latched = self.staged;
        record(self.log, Event::DutyUpdate(self.latched));
        Ok(())
    }

    fn duty(&self) -> u32 {
        self.latched
    }
}

pub struct MockPwm<'a> {
    log: &'a Log,
    timer: TimerConfig,
    pub fail_timer: bool,
}

impl<'a> MockPwm<'a> {
    pub fn new(log: &'a Log) -> Self {
        Self {
            log,
            timer: TimerConfig::default(),
            fail_timer: false,
        }
    }
}

impl<'a> PwmController for MockPwm<'a> {
    type Channel = MockChannel<'a>;

    fn configure_output(&mut self, line: u8) -> Result<(), PwmError> {
        record(self.log, Event::PwmOutput(line));
        Ok(())
    }

    fn configure_timer(&mut self, config: &TimerConfig) -> Result<(), PwmError> {
        if self.fail_timer {
            return Err(PwmError::InvalidTimer);
        }
        self.timer = *config;
        record(self.log, Event::PwmTimer(*config));
        Ok(())
    }

    fn bind_channel(&mut self, line: u8, duty: u32) -> Result<Self::Channel, PwmError> {
        record(self.log, Event::PwmBind { line, duty });
        Ok(MockChannel {
            log: self.log,
            max: self.timer.max_duty(),
            staged: duty,
            latched: duty,
        })
    }

    fn install_fade(&mut self) -> Result<(), PwmError> {
        record(self.log, Event::PwmFade);
        Ok(())
    }
}

pub struct MockDelay<'a> {
    log: &'a Log,
}

impl<'a> MockDelay<'a> {
    pub fn new(log: &'a Log) -> Self {
        Self { log }
    }
}

impl DelayMs for MockDelay<'_> {
    fn delay_ms(&mut self, ms: u32) {
        record(self.log, Event::Delay(ms));
    }
}

pub struct MockEngine<'a> {
    log: &'a Log,
    pub create_fails: bool,
    pub delay: Option<fn(u32)>,
    pub tick: Option<fn() -> u32>,
    next_display: u8,
    user_data: [Option<AdapterId>; 4],
}

impl<'a> MockEngine<'a> {
    pub fn new(log: &'a Log) -> Self {
        Self {
            log,
            create_fails: false,
            delay: None,
            tick: None,
            next_display: 0,
            user_data: [None; 4],
        }
    }
}

impl GraphicsEngine for MockEngine<'_> {
    fn init(&mut self) {
        record(self.log, Event::EngineInit);
    }

    fn set_delay_callback(&mut self, delay: fn(u32)) {
        self.delay = Some(delay);
        record(self.log, Event::DelayHook);
    }

    fn set_tick_callback(&mut self, tick: fn() -> u32) {
        self.tick = Some(tick);
        record(self.log, Event::TickHook);
    }

    fn tick_inc(&mut self, ms: u32) {
        record(self.log, Event::TickInc(ms));
    }

    fn create_display(&mut self, controller: Controller) -> Option<DisplayId> {
        if self.create_fails {
            return None;
        }
        record(self.log, Event::CreateDisplay(controller));
        let id = DisplayId(self.next_display);
        self.next_display += 1;
        Some(id)
    }

    fn set_invert(&mut self, _display: DisplayId, invert: bool) {
        record(self.log, Event::Invert(invert));
    }

    fn set_rotation(&mut self, _display: DisplayId, rotation: Rotation) {
        record(self.log, Event::Rotate(rotation));
    }

    fn set_buffers(&mut self, _display: DisplayId, len: usize, mode: RenderMode) {
        record(self.log, Event::Buffers { len, mode });
    }

    fn set_user_data(&mut self, display: DisplayId, adapter: AdapterId) {
        self.user_data[display.0 as usize] = Some(adapter);
        record(self.log, Event::UserData(adapter));
    }

    fn user_data(&self, display: DisplayId) -> Option<AdapterId> {
        self.user_data.get(display.0 as usize).copied().flatten()
    }
}

pub struct Notifier<'a> {
    log: &'a Log,
}

impl<'a> Notifier<'a> {
    pub fn new(log: &'a Log) -> Self {
        Self { log }
    }
}

impl FlushNotifier for Notifier<'_> {
    fn flush_ready(&mut self, display: DisplayId) {
        record(self.log, Event::FlushReady(display));
    }
}
