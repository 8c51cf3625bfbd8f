//! PackView Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the display transport and the
//! settings accessor are written against. Chip-specific crates implement
//! them, and host tests implement them with recording mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  packview-display / packview-core       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  packview-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!            ┌──────────────────┐
//!            │ packview-hal-    │
//!            │     rp2040       │
//!            └──────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::OutputBank`] - Digital outputs by line number
//! - [`spi::SpiHost`], [`spi::SpiDevice`] - Bus attachment and transactions
//! - [`pwm::PwmController`], [`pwm::PwmChannel`] - Dimming outputs
//! - [`delay::DelayMs`] - Blocking millisecond delays
//! - [`flash::FlashStorage`] - Persistent key-value storage

#![no_std]
#![deny(unsafe_code)]

pub mod delay;
pub mod flash;
pub mod gpio;
pub mod pwm;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use delay::DelayMs;
pub use flash::{AccessMode, FlashError, FlashStorage, StorageKey};
pub use gpio::{GpioError, Level, OutputBank, OutputPin};
pub use pwm::{PwmChannel, PwmController, PwmError, TimerConfig};
pub use spi::{DeviceConfig, SpiDevice, SpiError, SpiHost};
