//! MIPI-DBI command set shared by the supported TFT controllers

use packview_display::{Controller, Rotation};

/// Controller commands
pub mod cmd {
    pub const SWRESET: u8 = 0x01;
    pub const SLPOUT: u8 = 0x11;
    pub const NORON: u8 = 0x13;
    pub const INVOFF: u8 = 0x20;
    pub const INVON: u8 = 0x21;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const RASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const MADCTL: u8 = 0x36;
    pub const COLMOD: u8 = 0x3A;
}

/// COLMOD value for 16 bits per pixel
pub const PIXEL_FORMAT_RGB565: u8 = 0x55;

/// MADCTL bits
const MADCTL_MY: u8 = 0x80;
const MADCTL_MX: u8 = 0x40;
const MADCTL_MV: u8 = 0x20;
const MADCTL_BGR: u8 = 0x08;

/// One step of the bring-up sequence
pub struct InitStep {
    pub cmd: u8,
    pub params: &'static [u8],
    pub hold_ms: u32,
}

/// Sleep-out and pixel format; inversion and orientation are sent separately
pub const WAKE_SEQUENCE: [InitStep; 3] = [
    InitStep {
        cmd: cmd::SWRESET,
        params: &[],
        hold_ms: 150,
    },
    InitStep {
        cmd: cmd::SLPOUT,
        params: &[],
        hold_ms: 120,
    },
    InitStep {
        cmd: cmd::COLMOD,
        params: &[PIXEL_FORMAT_RGB565],
        hold_ms: 10,
    },
];

/// Memory access control byte for `rotation`
pub fn madctl(controller: Controller, rotation: Rotation) -> u8 {
    let orientation = match rotation {
        Rotation::Deg0 => 0,
        Rotation::Deg90 => MADCTL_MX | MADCTL_MV,
        Rotation::Deg180 => MADCTL_MY | MADCTL_MX,
        Rotation::Deg270 => MADCTL_MY | MADCTL_MV,
    };
    let order = match controller {
        Controller::St7735 | Controller::Ili9341 => MADCTL_BGR,
        Controller::St7789 | Controller::St7796 => 0,
    };
    orientation | order
}

/// CASET/RASET parameter bytes for an inclusive range
pub fn window(start: u16, end: u16) -> [u8; 4] {
    let [s_hi, s_lo] = start.to_be_bytes();
    let [e_hi, e_lo] = end.to_be_bytes();
    [s_hi, s_lo, e_hi, e_lo]
}
