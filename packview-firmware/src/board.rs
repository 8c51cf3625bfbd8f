//! Board wiring
//!
//! Raspberry Pi Pico with a 2" SPI TFT module on SPI0 and the debug
//! console on UART0.

/// Chip select
pub const LCD_CS: u8 = 17;
/// Data/command select
pub const LCD_DC: u8 = 20;
/// Panel reset
pub const LCD_RST: u8 = 21;
/// Backlight, PWM slice 3 output A
pub const LCD_BL: u8 = 22;

/// SPI clock for the panel
pub const LCD_CLOCK_HZ: u32 = 12_000_000;
