//! Display controller selection
//!
//! Exactly one controller variant is compiled in through cargo features.
//! A build with none selected still links; construction then reports the
//! missing controller instead of creating a display.

/// Supported MIPI-DBI TFT controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Controller {
    /// Sitronix ST7789, 240x320
    St7789,
    /// Sitronix ST7735, 128x160
    St7735,
    /// Sitronix ST7796, 320x480
    St7796,
    /// Ilitek ILI9341, 240x320
    Ili9341,
}

const ENABLED: usize = cfg!(feature = "st7789") as usize
    + cfg!(feature = "st7735") as usize
    + cfg!(feature = "st7796") as usize
    + cfg!(feature = "ili9341") as usize;

const _: () = assert!(ENABLED <= 1, "enable at most one display controller feature");

/// Controller chosen at build time, if any
pub const SELECTED: Option<Controller> = if cfg!(feature = "st7789") {
    Some(Controller::St7789)
} else if cfg!(feature = "st7735") {
    Some(Controller::St7735)
} else if cfg!(feature = "st7796") {
    Some(Controller::St7796)
} else if cfg!(feature = "ili9341") {
    Some(Controller::Ili9341)
} else {
    None
};

/// Bytes per pixel in RGB565
pub const BYTES_PER_PIXEL: usize = 2;

/// Fraction of a full frame covered by the partial-refresh buffer
pub const PARTIAL_FRACTION: usize = 10;

impl Controller {
    /// Native resolution as (horizontal, vertical) in portrait orientation
    pub const fn resolution(self) -> (u16, u16) {
        match self {
            Controller::St7789 => (240, 320),
            Controller::St7735 => (128, 160),
            Controller::St7796 => (320, 480),
            Controller::Ili9341 => (240, 320),
        }
    }

    /// Part name for diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            Controller::St7789 => "ST7789",
            Controller::St7735 => "ST7735",
            Controller::St7796 => "ST7796",
            Controller::Ili9341 => "ILI9341",
        }
    }

    /// Size of the partial-refresh buffer in bytes
    ///
    /// One tenth of the frame at 16 bits per pixel.
    pub const fn partial_buffer_len(self) -> usize {
        let (hor, ver) = self.resolution();
        (hor as usize) * (ver as usize) / PARTIAL_FRACTION * BYTES_PER_PIXEL
    }
}
