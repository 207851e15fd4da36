//! USB HID keyboard report (boot protocol compatible).
//!
//! Layout (8 bytes):
//! ```text
//! Byte 0: Modifier keys (bitfield)
//!         Bit 0 = Left Ctrl,  Bit 1 = Left Shift,
//!         Bit 2 = Left Alt,   Bit 3 = Left GUI,
//!         Bit 4 = Right Ctrl, Bit 5 = Right Shift,
//!         Bit 6 = Right Alt,  Bit 7 = Right GUI
//! Byte 1: Reserved (0x00)
//! Byte 2-7: Up to 6 simultaneous key codes (USB HID usage codes)
//! ```

use bitflags::bitflags;

/// Keyboard report size in bytes.
pub const KEYBOARD_REPORT_SIZE: usize = 8;

bitflags! {
    /// Modifier byte of a boot-keyboard report.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        const LEFT_CTRL = 0x01;
        const LEFT_SHIFT = 0x02;
        const LEFT_ALT = 0x04;
        const LEFT_GUI = 0x08;
        const RIGHT_CTRL = 0x10;
        const RIGHT_SHIFT = 0x20;
        const RIGHT_ALT = 0x40;
        const RIGHT_GUI = 0x80;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Modifiers {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Modifiers({=u8:#04x})", self.bits())
    }
}

bitflags! {
    /// Host keyboard LED state, sent to us as a 1-byte output report.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct HostLeds: u8 {
        const NUM_LOCK = 0x01;
        const CAPS_LOCK = 0x02;
        const SCROLL_LOCK = 0x04;
        const COMPOSE = 0x08;
        const KANA = 0x10;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for HostLeds {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "HostLeds({=u8:#04x})", self.bits())
    }
}

impl HostLeds {
    /// Decode a SET_REPORT output payload. Returns `None` for an empty payload.
    ///
    /// Padding bits above Kana are dropped.
    pub fn from_output_report(data: &[u8]) -> Option<Self> {
        data.first().map(|&bits| Self::from_bits_truncate(bits))
    }
}

/// Standard USB HID boot-protocol keyboard report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    /// Modifier key bitfield.
    pub modifier: u8,
    /// Reserved byte, always 0x00.
    pub reserved: u8,
    /// Up to 6 simultaneously pressed key codes.
    pub keycodes: [u8; 6],
}

impl KeyboardReport {
    /// Create an empty (all-keys-released) report.
    pub const fn empty() -> Self {
        Self {
            modifier: 0,
            reserved: 0,
            keycodes: [0; 6],
        }
    }

    /// Report pressing a single key with the given modifiers held.
    pub const fn key_down(modifier: Modifiers, scancode: u8) -> Self {
        Self {
            modifier: modifier.bits(),
            reserved: 0,
            keycodes: [scancode, 0, 0, 0, 0, 0],
        }
    }

    /// Serialise into a byte slice for USB HID transmission.
    /// Returns the number of bytes written (8, or 0 if `buf` is too small).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < KEYBOARD_REPORT_SIZE {
            return 0;
        }
        buf[0] = self.modifier;
        buf[1] = self.reserved;
        buf[2..8].copy_from_slice(&self.keycodes);
        KEYBOARD_REPORT_SIZE
    }

    /// Returns `true` if no keys are pressed (release event).
    pub fn is_empty(&self) -> bool {
        self.modifier == 0 && self.keycodes.iter().all(|&k| k == 0)
    }

    pub fn modifiers(&self) -> Modifiers {
        Modifiers::from_bits_retain(self.modifier)
    }
}
