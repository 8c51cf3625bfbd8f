//! Board-agnostic core logic for the pack telemetry display
//!
//! This crate contains the application logic that does not depend on
//! specific hardware implementations:
//!
//! - Typed settings accessor over the flash key-value store
//! - Topic filter matching and a fixed-capacity subscription table
//! - Telemetry fields, label formatting and charger state decoding
//! - Console command interpreter

#![no_std]
#![deny(unsafe_code)]

pub mod broker;
pub mod console;
pub mod settings;
pub mod telemetry;
pub mod topic;
