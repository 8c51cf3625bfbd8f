//! Display adapter lifecycle
//!
//! Construction brings a panel from cold to ready in a fixed order:
//!
//! 1. control lines (reset, chip-select, data/command) as outputs, idle high
//! 2. SPI attachment; on failure nothing else runs
//! 3. reset pulse: high 10 ms, low 10 ms, high 20 ms
//! 4. engine timing hooks, engine init, zero tick
//! 5. registration as the active adapter
//! 6. draw buffer check, display creation for the compiled-in controller
//! 7. inversion on, rotation 0, partial buffer, context binding
//! 8. backlight at 50%
//!
//! Failures leave the adapter inert with a recorded [`AdapterFault`];
//! callers check [`DisplayAdapter::display`] before use.

use core::ops::Range;

use packview_hal::{
    DelayMs, DeviceConfig, Level, OutputBank, OutputPin, PwmController, PwmError, SpiHost,
};

use crate::backlight::{Backlight, DEFAULT_INTENSITY};
use crate::bus::BusExecutor;
use crate::controller::{Controller, SELECTED};
use crate::dispatch::{ActiveAdapter, AdapterId, LcdTransport};
use crate::engine::{DisplayId, FlushNotifier, GraphicsEngine, RenderMode, Rotation};

/// Reset hold times in milliseconds: idle, active, recovery
pub const RESET_HOLDS_MS: [u32; 3] = [10, 10, 20];

/// Control line wiring; `None` marks an unconnected line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayPins {
    pub cs: Option<u8>,
    pub dc: Option<u8>,
    pub rst: Option<u8>,
    pub backlight: Option<u8>,
}

/// Adapter construction parameters
#[derive(Debug, Clone, Copy)]
pub struct DisplayConfig {
    /// Controller variant; defaults to the one compiled in
    pub controller: Option<Controller>,
    /// Control line wiring
    pub pins: DisplayPins,
    /// SPI clock in Hz
    pub clock_hz: u32,
    /// Blocking sleep handed to the engine
    pub delay: fn(u32),
    /// Monotonic millisecond clock handed to the engine
    pub tick: fn() -> u32,
}

impl DisplayConfig {
    /// Config for the compiled-in controller with nothing wired yet
    ///
    /// The timing hooks are mandatory: the engine sleeps and schedules
    /// refreshes through them.
    pub const fn new(delay: fn(u32), tick: fn() -> u32) -> Self {
        Self {
            controller: SELECTED,
            pins: DisplayPins {
                cs: None,
                dc: None,
                rst: None,
                backlight: None,
            },
            clock_hz: 12_000_000, // 12 MHz
            delay,
            tick,
        }
    }
}

/// Why an adapter is not (fully) functional
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdapterFault {
    /// SPI device could not be attached
    BusAttach,
    /// No controller variant compiled in
    NoController,
    /// Engine refused to create the display
    DisplayCreate,
    /// Draw buffer smaller than the controller's partial buffer
    Buffer { len: usize, needed: usize },
    /// Backlight PWM could not be set up
    Backlight(PwmError),
}

/// Hardware handed to [`DisplayAdapter::new`]
pub struct Hardware<'h, G, H, P, D> {
    pub gpio: &'h mut G,
    pub spi: H,
    pub pwm: &'h mut P,
    pub delay: &'h mut D,
}

/// SPI transport adapter for one TFT panel
pub struct DisplayAdapter<'b, G, H, P>
where
    G: OutputBank,
    H: SpiHost<Cs = G::Pin>,
    P: PwmController,
{
    id: AdapterId,
    host: H,
    bus: BusExecutor<H::Device, G::Pin>,
    reset: Option<G::Pin>,
    backlight: Option<Backlight<P::Channel>>,
    buffer: &'b mut [u8],
    display: Option<DisplayId>,
    fault: Option<AdapterFault>,
}

impl<'b, G, H, P> DisplayAdapter<'b, G, H, P>
where
    G: OutputBank,
    H: SpiHost<Cs = G::Pin>,
    P: PwmController,
{
    /// Bring up the panel and bind it into `engine`
    ///
    /// Never panics. Check [`display`](Self::display) for success and
    /// [`fault`](Self::fault) for the reason otherwise.
    pub fn new<D, E>(
        config: &DisplayConfig,
        hw: Hardware<'_, G, H, P, D>,
        engine: &mut E,
        active: &ActiveAdapter,
        buffer: &'b mut [u8],
    ) -> Self
    where
        D: DelayMs,
        E: GraphicsEngine,
    {
        let Hardware {
            gpio,
            spi,
            pwm,
            delay,
        } = hw;

        let reset = idle_high(gpio, "rst", config.pins.rst);
        let cs = idle_high(gpio, "cs", config.pins.cs);
        let dc = idle_high(gpio, "dc", config.pins.dc);

        let mut adapter = Self {
            id: AdapterId::next(),
            host: spi,
            bus: BusExecutor::new(dc),
            reset,
            backlight: None,
            buffer,
            display: None,
            fault: None,
        };

        let device_config = DeviceConfig {
            clock_hz: config.clock_hz,
            ..DeviceConfig::default()
        };
        match adapter.host.add_device(&device_config, cs) {
            Ok(device) => adapter.bus.attach(device),
            Err(err) => {
                error!("display: spi attach failed, rc={}", err.code());
                adapter.fault = Some(AdapterFault::BusAttach);
                return adapter;
            }
        }

        adapter.pulse_reset(delay);

        engine.set_delay_callback(config.delay);
        engine.set_tick_callback(config.tick);
        engine.init();
        engine.tick_inc(0);

        active.register(adapter.id);

        let Some(controller) = config.controller else {
            error!("display: no controller selected, enable one of st7789/st7735/st7796/ili9341");
            adapter.fault = Some(AdapterFault::NoController);
            return adapter;
        };

        let needed = controller.partial_buffer_len();
        if adapter.buffer.len() < needed {
            error!(
                "display: draw buffer {} bytes, {} needed",
                adapter.buffer.len(),
                needed
            );
            adapter.fault = Some(AdapterFault::Buffer {
                len: adapter.buffer.len(),
                needed,
            });
            return adapter;
        }

        let Some(display) = engine.create_display(controller) else {
            error!("display: engine could not create {} display", controller.name());
            adapter.fault = Some(AdapterFault::DisplayCreate);
            return adapter;
        };

        engine.set_invert(display, true);
        engine.set_rotation(display, Rotation::Deg0);
        engine.set_buffers(display, needed, RenderMode::Partial);
        engine.set_user_data(display, adapter.id);
        adapter.display = Some(display);

        if let Some(line) = config.pins.backlight {
            match Backlight::init(pwm, line) {
                Ok(backlight) => {
                    adapter.backlight = Some(backlight);
                    adapter.set_backlight(DEFAULT_INTENSITY);
                }
                Err(err) => {
                    warn!("display: backlight init failed: {}", err);
                    adapter.fault = Some(AdapterFault::Backlight(err));
                }
            }
        }

        info!("display: {} ready", controller.name());
        adapter
    }

    fn pulse_reset<D: DelayMs>(&mut self, delay: &mut D) {
        let Some(rst) = self.reset.as_mut() else {
            return;
        };
        let [idle, active, recovery] = RESET_HOLDS_MS;

        rst.set_high();
        delay.delay_ms(idle);
        rst.set_low();
        delay.delay_ms(active);
        rst.set_high();
        delay.delay_ms(recovery);
    }

    /// Engine display handle, `None` if construction failed
    pub fn display(&self) -> Option<DisplayId> {
        self.display
    }

    /// Construction fault, if any
    pub fn fault(&self) -> Option<AdapterFault> {
        self.fault
    }

    /// Failed SPI transactions since construction
    pub fn tx_failures(&self) -> u32 {
        self.bus.failures()
    }

    /// Set backlight intensity in percent (clamped to 100)
    pub fn set_backlight(&mut self, percent: u8) {
        let Some(backlight) = self.backlight.as_mut() else {
            debug!("display: no backlight wired");
            return;
        };
        if let Err(err) = backlight.set_intensity(percent) {
            warn!("display: backlight update failed: {}", err);
        }
    }

    /// Current backlight intensity, `None` without a backlight
    pub fn backlight(&self) -> Option<u8> {
        self.backlight.as_ref().map(Backlight::intensity)
    }

    /// Latched backlight duty, `None` without a backlight
    pub fn backlight_duty(&self) -> Option<u32> {
        self.backlight.as_ref().map(Backlight::duty)
    }
}

fn idle_high<G: OutputBank>(gpio: &mut G, role: &'static str, line: Option<u8>) -> Option<G::Pin> {
    let line = line?;
    match gpio.output(line, Level::High) {
        Ok(pin) => Some(pin),
        Err(err) => {
            warn!("display: {} line {} unavailable: {}", role, line, err);
            None
        }
    }
}

impl<G, H, P> LcdTransport for DisplayAdapter<'_, G, H, P>
where
    G: OutputBank,
    H: SpiHost<Cs = G::Pin>,
    P: PwmController,
{
    fn id(&self) -> AdapterId {
        self.id
    }

    fn frame_buffer(&mut self) -> &mut [u8] {
        &mut self.buffer[..]
    }

    fn send_command(&mut self, cmd: &[u8], param: &[u8]) {
        self.bus.execute(cmd, param);
    }

    fn send_color(
        &mut self,
        display: DisplayId,
        cmd: &[u8],
        pixels: Range<usize>,
        done: &mut dyn FlushNotifier,
    ) {
        match self.buffer.get(pixels.clone()) {
            Some(payload) => self.bus.execute(cmd, payload),
            None => {
                warn!(
                    "display: pixel range {}..{} outside {} byte buffer",
                    pixels.start,
                    pixels.end,
                    self.buffer.len()
                );
                self.bus.execute(cmd, &[]);
            }
        }
        done.flush_ready(display);
    }
}

impl<G, H, P> Drop for DisplayAdapter<'_, G, H, P>
where
    G: OutputBank,
    H: SpiHost<Cs = G::Pin>,
    P: PwmController,
{
    fn drop(&mut self) {
        if let Some(device) = self.bus.detach() {
            self.host.remove_device(device);
        }
        self.display = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{FlushTarget, Router};
    use crate::testing::{
        Event, Log, MockDelay, MockEngine, MockGpio, MockHost, MockPwm, Notifier,
    };
    use core::cell::RefCell;

    const CS: u8 = 14;
    const DC: u8 = 15;
    const RST: u8 = 21;
    const BL: u8 = 22;
    const BUF_LEN: usize = Controller::St7789.partial_buffer_len();

    fn test_delay(_ms: u32) {}

    fn test_tick() -> u32 {
        1234
    }

    type Adapter<'a, 'b> = DisplayAdapter<'b, MockGpio<'a>, MockHost<'a>, MockPwm<'a>>;

    fn wired() -> DisplayConfig {
        DisplayConfig {
            controller: Some(Controller::St7789),
            pins: DisplayPins {
                cs: Some(CS),
                dc: Some(DC),
                rst: Some(RST),
                backlight: Some(BL),
            },
            ..DisplayConfig::new(test_delay, test_tick)
        }
    }

    fn build<'a, 'b>(
        config: &DisplayConfig,
        log: &'a Log,
        host: MockHost<'a>,
        engine: &mut MockEngine<'a>,
        active: &ActiveAdapter,
        buffer: &'b mut [u8],
    ) -> Adapter<'a, 'b> {
        build_with(config, log, MockGpio::new(log), host, engine, active, buffer)
    }

    fn build_with<'a, 'b>(
        config: &DisplayConfig,
        log: &'a Log,
        mut gpio: MockGpio<'a>,
        host: MockHost<'a>,
        engine: &mut MockEngine<'a>,
        active: &ActiveAdapter,
        buffer: &'b mut [u8],
    ) -> Adapter<'a, 'b> {
        let mut pwm = MockPwm::new(log);
        let mut delay = MockDelay::new(log);
        let hw = Hardware {
            gpio: &mut gpio,
            spi: host,
            pwm: &mut pwm,
            delay: &mut delay,
        };
        DisplayAdapter::new(config, hw, engine, active, buffer)
    }

    #[test]
    fn test_construction_order() {
        let log = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        let active = ActiveAdapter::new();
        let mut buffer = [0u8; BUF_LEN];

        let adapter = build(&wired(), &log, MockHost::new(&log), &mut engine, &active, &mut buffer);

        assert_eq!(adapter.display(), Some(DisplayId(0)));
        assert_eq!(adapter.fault(), None);
        assert_eq!(active.get(), Some(adapter.id()));
        assert_eq!(
            log.borrow().as_slice(),
            &[
                Event::Configure { line: RST, level: Level::High },
                Event::Configure { line: CS, level: Level::High },
                Event::Configure { line: DC, level: Level::High },
                Event::Attach { clock_hz: 12_000_000, cs: Some(CS) },
                Event::Pin { line: RST, level: Level::High },
                Event::Delay(10),
                Event::Pin { line: RST, level: Level::Low },
                Event::Delay(10),
                Event::Pin { line: RST, level: Level::High },
                Event::Delay(20),
                Event::DelayHook,
                Event::TickHook,
                Event::EngineInit,
                Event::TickInc(0),
                Event::CreateDisplay(Controller::St7789),
                Event::Invert(true),
                Event::Rotate(Rotation::Deg0),
                Event::Buffers { len: BUF_LEN, mode: RenderMode::Partial },
                Event::UserData(adapter.id()),
                Event::PwmOutput(BL),
                Event::PwmTimer(crate::backlight::BACKLIGHT_TIMER),
                Event::PwmBind { line: BL, duty: 0 },
                Event::PwmFade,
                Event::DutySet(8191 - 81 * 50),
                Event::DutyUpdate(8191 - 81 * 50),
            ]
        );
        assert_eq!(adapter.backlight(), Some(50));
    }

    #[test]
    fn test_reset_precedes_first_transaction() {
        let log = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        let active = ActiveAdapter::new();
        let mut buffer = [0u8; BUF_LEN];
        let mut adapter = build(&wired(), &log, MockHost::new(&log), &mut engine, &active, &mut buffer);

        adapter.send_command(&[0x01], &[]);

        let log = log.borrow();
        let rst_levels: heapless::Vec<Level, 4> = log
            .iter()
            .filter_map(|e| match e {
                Event::Pin { line: RST, level } => Some(*level),
                _ => None,
            })
            .collect();
        assert_eq!(rst_levels.as_slice(), &[Level::High, Level::Low, Level::High]);

        let first_tx = log.iter().position(|e| matches!(e, Event::Tx { .. }));
        let last_hold = log.iter().rposition(|e| *e == Event::Delay(20));
        assert!(last_hold < first_tx);
    }

    #[test]
    fn test_unwired_lines_are_never_touched() {
        let log = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        let active = ActiveAdapter::new();
        let mut buffer = [0u8; BUF_LEN];
        let config = DisplayConfig {
            controller: Some(Controller::St7789),
            ..DisplayConfig::new(test_delay, test_tick)
        };

        let mut adapter = build(&config, &log, MockHost::new(&log), &mut engine, &active, &mut buffer);
        adapter.send_command(&[0x2A], &[0x00, 0xEF]);

        let log = log.borrow();
        assert!(!log
            .iter()
            .any(|e| matches!(e, Event::Configure { .. } | Event::Pin { .. } | Event::Delay(_))));
        assert!(log.contains(&Event::Attach { clock_hz: 12_000_000, cs: None }));
        assert_eq!(adapter.backlight(), None);
    }

    #[test]
    fn test_attach_failure_stops_initialization() {
        let log = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        let active = ActiveAdapter::new();
        let mut buffer = [0u8; BUF_LEN];
        let mut host = MockHost::new(&log);
        host.fail_attach = true;

        let adapter = build(&wired(), &log, host, &mut engine, &active, &mut buffer);

        assert_eq!(adapter.display(), None);
        assert_eq!(adapter.fault(), Some(AdapterFault::BusAttach));
        assert_eq!(active.get(), None);
        let log = log.borrow();
        assert!(!log.iter().any(|e| matches!(
            e,
            Event::Delay(_) | Event::EngineInit | Event::CreateDisplay(_) | Event::PwmBind { .. }
        )));
    }

    #[test]
    fn test_missing_controller_leaves_display_empty() {
        let log = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        let active = ActiveAdapter::new();
        let mut buffer = [0u8; BUF_LEN];
        let config = DisplayConfig {
            controller: None,
            ..wired()
        };

        let adapter = build(&config, &log, MockHost::new(&log), &mut engine, &active, &mut buffer);

        assert_eq!(adapter.display(), None);
        assert_eq!(adapter.fault(), Some(AdapterFault::NoController));
        assert!(!log.borrow().iter().any(|e| matches!(e, Event::CreateDisplay(_))));
    }

    #[test]
    fn test_engine_refusal_is_a_fault() {
        let log = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        engine.create_fails = true;
        let active = ActiveAdapter::new();
        let mut buffer = [0u8; BUF_LEN];

        let adapter = build(&wired(), &log, MockHost::new(&log), &mut engine, &active, &mut buffer);

        assert_eq!(adapter.display(), None);
        assert_eq!(adapter.fault(), Some(AdapterFault::DisplayCreate));
    }

    #[test]
    fn test_backlight_failure_keeps_display() {
        let log = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        let active = ActiveAdapter::new();
        let mut buffer = [0u8; BUF_LEN];
        let mut gpio = MockGpio::new(&log);
        let mut pwm = MockPwm::new(&log);
        pwm.fail_timer = true;
        let mut delay = MockDelay::new(&log);
        let hw = Hardware {
            gpio: &mut gpio,
            spi: MockHost::new(&log),
            pwm: &mut pwm,
            delay: &mut delay,
        };

        let adapter = DisplayAdapter::new(&wired(), hw, &mut engine, &active, &mut buffer);

        assert!(adapter.display().is_some());
        assert_eq!(adapter.fault(), Some(AdapterFault::Backlight(PwmError::InvalidTimer)));
        assert_eq!(adapter.backlight_duty(), None);
    }

    #[test]
    fn test_send_command_line_discipline() {
        let log = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        let active = ActiveAdapter::new();
        let mut buffer = [0u8; BUF_LEN];
        let mut adapter = build(&wired(), &log, MockHost::new(&log), &mut engine, &active, &mut buffer);
        log.borrow_mut().clear();

        adapter.send_command(&[0x2B], &[0x00, 0x00, 0x01, 0x3F]);

        assert_eq!(
            log.borrow().as_slice(),
            &[
                Event::Pin { line: DC, level: Level::Low },
                Event::Tx { len: 1, first: 0x2B },
                Event::Pin { line: DC, level: Level::High },
                Event::Tx { len: 4, first: 0x00 },
            ]
        );
    }

    #[test]
    fn test_send_color_signals_once_after_pixels() {
        let log = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        let active = ActiveAdapter::new();
        let mut buffer = [0u8; BUF_LEN];
        let mut adapter = build(&wired(), &log, MockHost::new(&log), &mut engine, &active, &mut buffer);
        adapter.frame_buffer()[4] = 0xF8;
        log.borrow_mut().clear();
        let mut done = Notifier::new(&log);

        adapter.send_color(DisplayId(0), &[0x2C], 4..12, &mut done);

        assert_eq!(
            log.borrow().as_slice(),
            &[
                Event::Pin { line: DC, level: Level::Low },
                Event::Tx { len: 1, first: 0x2C },
                Event::Pin { line: DC, level: Level::High },
                Event::Tx { len: 8, first: 0xF8 },
                Event::FlushReady(DisplayId(0)),
            ]
        );
    }

    #[test]
    fn test_send_color_signals_on_failure() {
        let log = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        let active = ActiveAdapter::new();
        let mut buffer = [0u8; BUF_LEN];
        let mut host = MockHost::new(&log);
        host.fail_tx = true;
        let mut adapter = build(&wired(), &log, host, &mut engine, &active, &mut buffer);
        log.borrow_mut().clear();
        let mut done = Notifier::new(&log);

        adapter.send_color(DisplayId(0), &[0x2C], 0..16, &mut done);

        let log = log.borrow();
        let ready = log.iter().filter(|e| matches!(e, Event::FlushReady(_))).count();
        assert_eq!(ready, 1);
        assert_eq!(log.last(), Some(&Event::FlushReady(DisplayId(0))));
        assert_eq!(adapter.tx_failures(), 2);
    }

    #[test]
    fn test_send_color_without_payload_still_signals() {
        let log = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        let active = ActiveAdapter::new();
        let mut buffer = [0u8; BUF_LEN];
        let mut adapter = build(&wired(), &log, MockHost::new(&log), &mut engine, &active, &mut buffer);
        log.borrow_mut().clear();
        let mut done = Notifier::new(&log);

        adapter.send_color(DisplayId(0), &[], 0..0, &mut done);
        adapter.send_color(DisplayId(0), &[], BUF_LEN..BUF_LEN + 8, &mut done);

        assert_eq!(
            log.borrow().as_slice(),
            &[Event::FlushReady(DisplayId(0)), Event::FlushReady(DisplayId(0))]
        );
    }

    #[test]
    fn test_teardown_detaches_device() {
        let log = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        let active = ActiveAdapter::new();
        let mut buffer = [0u8; BUF_LEN];
        let adapter = build(&wired(), &log, MockHost::new(&log), &mut engine, &active, &mut buffer);

        drop(adapter);

        assert_eq!(log.borrow().last(), Some(&Event::Detach));
    }

    #[test]
    fn test_teardown_after_failed_attach_is_quiet() {
        let log = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        let active = ActiveAdapter::new();
        let mut buffer = [0u8; BUF_LEN];
        let mut host = MockHost::new(&log);
        host.fail_attach = true;
        let adapter = build(&wired(), &log, host, &mut engine, &active, &mut buffer);

        drop(adapter);

        assert!(!log.borrow().contains(&Event::Detach));
    }

    #[test]
    fn test_fallback_reaches_last_constructed_adapter() {
        let log = RefCell::new(heapless::Vec::new());
        let log_b = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        let active = ActiveAdapter::new();
        let mut buf_a = [0u8; BUF_LEN];
        let mut buf_b = [0u8; BUF_LEN];

        let a = build(&wired(), &log, MockHost::new(&log), &mut engine, &active, &mut buf_a);
        let b = build(&wired(), &log, MockHost::new(&log_b), &mut engine, &active, &mut buf_b);
        let b_id = b.id();
        log_b.borrow_mut().clear();

        let mut adapters = [a, b];
        let mut router = Router::new(&mut adapters, &active);
        router.send_command(
            crate::engine::DisplayRef {
                id: DisplayId(0),
                context: None,
            },
            &[0x29],
            &[],
        );

        assert_eq!(active.get(), Some(b_id));
        assert_eq!(log_b.borrow().as_slice(), &[Event::Tx { len: 1, first: 0x29 }]);
    }

    #[test]
    fn test_bound_context_routes_to_owner() {
        let log = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        let active = ActiveAdapter::new();
        let mut buffer = [0u8; BUF_LEN];
        let adapter = build(&wired(), &log, MockHost::new(&log), &mut engine, &active, &mut buffer);
        let display = adapter.display();
        log.borrow_mut().clear();

        let mut adapters = [adapter];
        let display_ref = match display {
            Some(id) => engine.display_ref(id),
            None => panic!("display not created"),
        };
        assert_eq!(display_ref.context, Some(adapters[0].id()));

        let mut done = Notifier::new(&log);
        let mut router = Router::new(&mut adapters, &active);
        router.send_color(display_ref, &[0x2C], 0..2, &mut done);

        assert_eq!(log.borrow().last(), Some(&Event::FlushReady(DisplayId(0))));
    }

    #[test]
    fn test_config_hooks_reach_engine() {
        let log = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        let active = ActiveAdapter::new();
        let mut buffer = [0u8; BUF_LEN];

        let _adapter = build(&wired(), &log, MockHost::new(&log), &mut engine, &active, &mut buffer);

        assert_eq!(engine.tick.map(|tick| tick()), Some(1234));
        assert!(engine.delay.is_some());
    }

    #[test]
    fn test_unavailable_dc_line_is_unconnected() {
        let log = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        let active = ActiveAdapter::new();
        let mut buffer = [0u8; BUF_LEN];
        let mut gpio = MockGpio::new(&log);
        gpio.fail_line = Some(DC);

        let mut adapter = build_with(
            &wired(),
            &log,
            gpio,
            MockHost::new(&log),
            &mut engine,
            &active,
            &mut buffer,
        );
        assert!(adapter.display().is_some());
        assert_eq!(adapter.fault(), None);
        assert!(!log
            .borrow()
            .iter()
            .any(|e| matches!(e, Event::Configure { line: DC, .. })));
        log.borrow_mut().clear();

        adapter.send_command(&[0x2B], &[0x00, 0x01]);

        assert_eq!(
            log.borrow().as_slice(),
            &[
                Event::Tx { len: 1, first: 0x2B },
                Event::Tx { len: 2, first: 0x00 },
            ]
        );
    }

    #[test]
    fn test_unavailable_rst_line_skips_pulse() {
        let log = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        let active = ActiveAdapter::new();
        let mut buffer = [0u8; BUF_LEN];
        let mut gpio = MockGpio::new(&log);
        gpio.fail_line = Some(RST);

        let adapter = build_with(
            &wired(),
            &log,
            gpio,
            MockHost::new(&log),
            &mut engine,
            &active,
            &mut buffer,
        );

        assert!(adapter.display().is_some());
        assert_eq!(adapter.fault(), None);
        let log = log.borrow();
        assert!(!log.iter().any(|e| matches!(
            e,
            Event::Configure { line: RST, .. } | Event::Pin { line: RST, .. } | Event::Delay(_)
        )));
        assert!(log.contains(&Event::Attach { clock_hz: 12_000_000, cs: Some(CS) }));
        assert!(log.contains(&Event::CreateDisplay(Controller::St7789)));
    }

    #[test]
    fn test_undersized_buffer_is_a_fault() {
        let log = RefCell::new(heapless::Vec::new());
        let mut engine = MockEngine::new(&log);
        let active = ActiveAdapter::new();
        let mut buffer = [0u8; 64];

        let adapter = build(&wired(), &log, MockHost::new(&log), &mut engine, &active, &mut buffer);

        assert_eq!(adapter.display(), None);
        assert_eq!(
            adapter.fault(),
            Some(AdapterFault::Buffer {
                len: 64,
                needed: BUF_LEN,
            })
        );
        assert!(!log
            .borrow()
            .iter()
            .any(|e| matches!(e, Event::CreateDisplay(_) | Event::Buffers { .. })));
    }
}
