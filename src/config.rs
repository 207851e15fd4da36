//! Application-wide constants and compile-time configuration.
//!
//! USB identity, timing parameters and the macro bound live here so they
//! can be tuned in one place.

// USB

/// USB VID/PID - TinyUSB-style test IDs, keyboard interface only.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0xCAFE;
pub const USB_PID: u16 = 0x4004;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "bootkey";
pub const USB_PRODUCT: &str = "BOOTSEL Macro Keyboard";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// Bus current drawn while configured (mA).
pub const USB_MAX_POWER_MA: u16 = 100;

/// USB HID polling interval (ms).
pub const USB_HID_POLL_MS: u8 = 10;

// Task loop

/// Period of the cooperative driver tick (ms).
///
/// At most one report leaves per tick, so this is also the minimum time a
/// key stays down before its release report.
pub const TICK_MS: u64 = 10;

// Button

/// QSPI pad index of the flash chip-select line (BOOTSEL pulls it low).
pub const BOOTSEL_CS_PIN_INDEX: usize = 1;

/// Spin iterations while the chip-select output is released, before the
/// pad is sampled. Runs with interrupts masked, so keep it short.
pub const BOOTSEL_SETTLE_SPINS: u32 = 1000;

// Macro playback

/// Upper bound on steps scanned when looking for the end-of-script sentinel.
pub const MAX_SCRIPT_STEPS: usize = 64;

// Status LED blink pattern

/// Blink interval while the device is not mounted (ms).
pub const BLINK_NOT_MOUNTED_MS: u64 = 250;

/// Blink interval while the device is mounted (ms).
pub const BLINK_MOUNTED_MS: u64 = 1000;

/// Blink interval while the bus is suspended (ms).
pub const BLINK_SUSPENDED_MS: u64 = 2500;
