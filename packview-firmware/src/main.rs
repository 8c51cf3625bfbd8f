//! PackView - Battery Pack Telemetry Display Firmware
//!
//! Drives an SPI TFT panel on RP2040 and shows the pack values published
//! by the BMS. Telemetry publishes and settings changes come in over the
//! debug console on UART0.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::AnyPin;
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::spi::{Config as SpiConfig, Spi};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_rp::Peri;
use embassy_time::Timer;
use embedded_io_async::{Read, Write};
use heapless::String;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use packview_core::console;
use packview_core::settings::{Settings, SettingsError};
use packview_core::telemetry::TelemetryBoard;
use packview_display::controller::SELECTED;
use packview_display::{DisplayAdapter, DisplayConfig, DisplayPins, Hardware, Router, ACTIVE_ADAPTER};
use packview_hal::FlashStorage;
use packview_hal_rp2040::pwm::SliceOutput;
use packview_hal_rp2040::{
    block_ms, uptime_ms, PinBank, Rp2040Delay, Rp2040FlashStorage, Rp2040Pwm, Rp2040SpiHost,
};

use crate::engine::LabelEngine;
use crate::line::LineBuffer;

mod board;
mod engine;
mod line;
mod mipi;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// Draw buffer size for the compiled-in controller
const DRAW_BUFFER_LEN: usize = match SELECTED {
    Some(controller) => controller.partial_buffer_len(),
    None => 0,
};

// Static cells for buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static DRAW_BUFFER: StaticCell<[u8; DRAW_BUFFER_LEN]> = StaticCell::new();

/// Console output collected per command
type ConsoleOutput = String<512>;

/// Pause between loop iterations when the console is idle
const LOOP_YIELD_MS: u64 = 1;

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("PackView firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let mut settings = Settings::new(Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0));
    match count_boot(&mut settings).await {
        Ok(boots) => info!("Boot #{}", boots),
        Err(e) => warn!("Boot counter not updated: {:?}", e),
    }

    // Debug console
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (mut tx, mut rx) = uart.split();
    info!("UART initialized for console");

    // Panel control lines are handed out by number
    let mut pins = PinBank::new();
    let wired: [(u8, Peri<'static, AnyPin>); 3] = [
        (board::LCD_CS, p.PIN_17.into()),
        (board::LCD_DC, p.PIN_20.into()),
        (board::LCD_RST, p.PIN_21.into()),
    ];
    for (line, pin) in wired {
        if let Err(e) = pins.insert(line, pin) {
            warn!("GPIO{} not available: {:?}", line, e);
        }
    }

    let spi = Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, SpiConfig::default());
    let backlight = Pwm::new_output_a(p.PWM_SLICE3, p.PIN_22, PwmConfig::default());
    let mut pwm = Rp2040Pwm::new(backlight, board::LCD_BL, SliceOutput::A);
    let mut delay = Rp2040Delay;

    let config = DisplayConfig {
        pins: DisplayPins {
            cs: Some(board::LCD_CS),
            dc: Some(board::LCD_DC),
            rst: Some(board::LCD_RST),
            backlight: Some(board::LCD_BL),
        },
        clock_hz: board::LCD_CLOCK_HZ,
        ..DisplayConfig::new(block_ms, uptime_ms)
    };

    let mut engine = LabelEngine::new();
    let mut adapter = DisplayAdapter::new(
        &config,
        Hardware {
            gpio: &mut pins,
            spi: Rp2040SpiHost::new(spi),
            pwm: &mut pwm,
            delay: &mut delay,
        },
        &mut engine,
        &ACTIVE_ADAPTER,
        DRAW_BUFFER.init_with(|| [0u8; DRAW_BUFFER_LEN]),
    );
    if let Some(fault) = adapter.fault() {
        error!("Display not fully up: {:?}", fault);
    }

    let mut telemetry = TelemetryBoard::new();
    let mut lines = LineBuffer::new();
    let mut buf = [0u8; 32];

    info!("PackView running");

    loop {
        let read = select(
            rx.read(&mut buf),
            Timer::after_millis(LOOP_YIELD_MS),
        )
        .await;

        match read {
            Either::First(Ok(n)) => {
                for &byte in &buf[..n] {
                    let Some(line) = lines.push(byte) else {
                        continue;
                    };
                    let mut out = ConsoleOutput::new();
                    if let Err(e) = console::run_line(&line, &mut settings, &mut telemetry, &mut out).await {
                        debug!("Console command failed: {:?}", e);
                    }
                    if let Err(e) = tx.write_all(out.as_bytes()).await {
                        warn!("UART write error: {:?}", e);
                    }
                }
            }
            Either::First(Err(e)) => {
                warn!("UART read error: {:?}", e);
            }
            Either::Second(()) => {}
        }

        let mut router = Router::new(core::slice::from_mut(&mut adapter), &ACTIVE_ADAPTER);
        let drawn = engine.refresh(&mut telemetry, &mut router);
        if drawn > 0 {
            trace!("Redrew {} labels", drawn);
        }
    }
}

/// Bump the persistent boot counter
async fn count_boot<S: FlashStorage>(settings: &mut Settings<S>) -> Result<i32, SettingsError> {
    let mut writer = settings.writer()?;
    writer.increment_boot_count().await
}
