//! bootkey - BOOTSEL-button macro keyboard for the RP2040.
//!
//! Pressing the Pico's BOOTSEL button types a fixed keystroke sequence to
//! the host over USB HID. Everything except the RP2040 register access and
//! the Embassy USB plumbing is plain `no_std` logic that builds and tests
//! on the host.
//!
//! Usage: `cargo test --lib` (host), `cargo run --release --features embedded
//! --target thumbv6m-none-eabi` (target, via probe-rs).
//!
//! Note: The embedded binary lives in main.rs with #![no_std] and #![no_main]
//! and only builds with the `embedded` feature.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod hid;
pub mod input;
pub mod macros;
pub mod status;
pub mod task;
pub mod usb;

pub use error::{Error, ScriptError};
pub use task::{DeviceEvent, TaskDriver, TickOutcome, UsbLink};
