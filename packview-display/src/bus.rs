//! Bus transaction executor
//!
//! Turns a (command, parameter) pair into SPI transactions with the
//! data/command line bracketed around the command bytes only:
//!
//! ```text
//!  DC  ‾‾‾‾‾\_________/‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//!  SPI       [ cmd ]     [ param / pixels ]
//! ```
//!
//! Transport errors are logged and counted. They never reach the caller:
//! the engine callbacks have no error channel.

use packview_hal::{OutputPin, SpiDevice};

/// Executes command and parameter transactions on one SPI device
pub struct BusExecutor<D, P> {
    device: Option<D>,
    dc: Option<P>,
    failures: u32,
}

impl<D: SpiDevice, P: OutputPin> BusExecutor<D, P> {
    /// Create an executor with no device attached yet
    ///
    /// `dc` is expected to already idle high (data mode).
    pub fn new(dc: Option<P>) -> Self {
        Self {
            device: None,
            dc,
            failures: 0,
        }
    }

    /// Take ownership of an attached device
    pub fn attach(&mut self, device: D) {
        self.device = Some(device);
    }

    /// Give the device back for detachment
    pub fn detach(&mut self) -> Option<D> {
        self.device.take()
    }

    /// Check whether a device is attached
    pub fn is_attached(&self) -> bool {
        self.device.is_some()
    }

    /// Number of failed transactions since creation
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Send `cmd` in command mode, then `param` in data mode
    ///
    /// Either half may be empty and is then skipped. A failed command
    /// transaction does not stop the parameter transaction.
    pub fn execute(&mut self, cmd: &[u8], param: &[u8]) {
        if !cmd.is_empty() {
            if let Some(dc) = self.dc.as_mut() {
                dc.set_low();
            }
            self.transmit(cmd);
            if let Some(dc) = self.dc.as_mut() {
                dc.set_high();
            }
        }

        if !param.is_empty() {
            self.transmit(param);
        }
    }

    fn transmit(&mut self, bytes: &[u8]) {
        let Some(device) = self.device.as_mut() else {
            debug!("spi: no device attached, dropped {} bytes", bytes.len());
            return;
        };

        if let Err(err) = device.transmit(bytes) {
            self.failures = self.failures.wrapping_add(1);
            warn!(
                "spi: transmit of {} bytes failed, rc={}",
                bytes.len(),
                err.code()
            );
        }
    }
}
