//! Blocking SPI host
//!
//! The RP2040 SPI blocks own the bus exclusively, so the host lends the
//! peripheral to at most one device at a time. Chip select is driven in
//! software around each transmit.

use embassy_rp::spi::{Blocking, Config, Instance, Phase, Polarity, Spi};
use packview_hal::{DeviceConfig, OutputPin, SpiDevice, SpiError, SpiHost};

use crate::gpio::Rp2040Output;

/// Highest SCK the peripheral can produce (clk_peri / 2)
pub const MAX_CLOCK_HZ: u32 = 62_500_000;

/// SPI bus that can carry one attached device
pub struct Rp2040SpiHost<'d, T: Instance> {
    spi: Option<Spi<'d, T, Blocking>>,
}

impl<'d, T: Instance> Rp2040SpiHost<'d, T> {
    /// Wrap an initialized bus
    pub fn new(spi: Spi<'d, T, Blocking>) -> Self {
        Self { spi: Some(spi) }
    }
}

impl<'d, T: Instance> SpiHost for Rp2040SpiHost<'d, T> {
    type Cs = Rp2040Output;
    type Device = Rp2040SpiDevice<'d, T>;

    fn add_device(&mut self, config: &DeviceConfig, cs: Option<Self::Cs>) -> Result<Self::Device, SpiError> {
        if config.clock_hz == 0 || config.clock_hz > MAX_CLOCK_HZ {
            return Err(SpiError::InvalidClock);
        }
        let mut spi = self.spi.take().ok_or(SpiError::Busy)?;

        let (polarity, phase) = config.mode.into();
        let mut bus_config = Config::default();
        bus_config.frequency = config.clock_hz;
        bus_config.polarity = match polarity {
            packview_hal::spi::Polarity::IdleLow => Polarity::IdleLow,
            packview_hal::spi::Polarity::IdleHigh => Polarity::IdleHigh,
        };
        bus_config.phase = match phase {
            packview_hal::spi::Phase::CaptureOnFirstTransition => Phase::CaptureOnFirstTransition,
            packview_hal::spi::Phase::CaptureOnSecondTransition => Phase::CaptureOnSecondTransition,
        };
        spi.set_config(&bus_config);

        Ok(Rp2040SpiDevice { spi, cs })
    }

    fn remove_device(&mut self, device: Self::Device) {
        let Rp2040SpiDevice { spi, cs } = device;
        // Dropping the chip select returns the line to its reset state
        drop(cs);
        self.spi = Some(spi);
    }
}

/// Device holding the bus and its chip select
pub struct Rp2040SpiDevice<'d, T: Instance> {
    spi: Spi<'d, T, Blocking>,
    cs: Option<Rp2040Output>,
}

impl<T: Instance> SpiDevice for Rp2040SpiDevice<'_, T> {
    fn transmit(&mut self, data: &[u8]) -> Result<(), SpiError> {
        if let Some(cs) = self.cs.as_mut() {
            cs.set_low();
        }
        let result = self.spi.blocking_write(data).map_err(|_| SpiError::Transfer);
        if let Some(cs) = self.cs.as_mut() {
            cs.set_high();
        }
        result
    }
}
