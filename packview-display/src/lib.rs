//! SPI transport adapter for MIPI-DBI TFT panels
//!
//! Bridges a retained-mode graphics engine to a write-only SPI bus:
//!
//! ```text
//!  engine ──send_command/send_color──▶ Router ──▶ DisplayAdapter
//!    ▲                                               │
//!    └──────────────── flush_ready ◀─────────────────┤
//!                                                    ▼
//!                                  BusExecutor (DC line + SPI device)
//! ```
//!
//! - [`adapter`] - construction, reset sequencing and teardown
//! - [`bus`] - command/parameter transactions with data/command line control
//! - [`dispatch`] - callback contract and adapter resolution
//! - [`backlight`] - PWM dimming
//! - [`controller`] - build-time controller selection
//! - [`engine`] - graphics engine boundary

#![no_std]
#![deny(unsafe_code)]

mod fmt;

pub mod adapter;
pub mod backlight;
pub mod bus;
pub mod controller;
pub mod dispatch;
pub mod engine;

#[cfg(test)]
mod testing;

pub use adapter::{AdapterFault, DisplayAdapter, DisplayConfig, DisplayPins, Hardware};
pub use controller::Controller;
pub use dispatch::{ActiveAdapter, AdapterId, FlushTarget, LcdTransport, Router, ACTIVE_ADAPTER};
pub use engine::{DisplayId, DisplayRef, FlushNotifier, GraphicsEngine, RenderMode, Rotation};
