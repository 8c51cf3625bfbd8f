//! RP2040-specific HAL for the pack telemetry display
//!
//! This crate provides RP2040 implementations of the shared
//! `packview-hal` traits:
//!
//! - Output pins handed out by line number from a [`PinBank`]
//! - Blocking SPI host with a single attached device
//! - PWM slice driving the backlight
//! - Busy-wait delay and uptime hooks
//! - Flash storage driver (implements `packview_hal::FlashStorage`)

#![no_std]
#![deny(unsafe_code)]

pub mod delay;
pub mod flash;
pub mod gpio;
pub mod pwm;
pub mod spi;

pub use delay::{block_ms, uptime_ms, Rp2040Delay};
pub use flash::Rp2040FlashStorage;
pub use gpio::{PinBank, Rp2040Output};
pub use pwm::{Rp2040Pwm, Rp2040PwmChannel};
pub use spi::{Rp2040SpiDevice, Rp2040SpiHost};

// Re-export shared traits from packview-hal for convenience
pub use packview_hal::{FlashStorage as FlashStorageTrait, StorageKey};
