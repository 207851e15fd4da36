//! BOOTSEL button sampling on the RP2040.
//!
//! The BOOTSEL switch is wired to the QSPI flash chip-select through a
//! resistor, not to a GPIO. Reading it means briefly releasing the CS
//! output driver and looking at the pad level. While CS floats the flash
//! is unreachable, so:
//!
//! - interrupts stay masked for the whole read (handlers may live in flash)
//! - the read itself runs from RAM and must not call into flash
//!
//! The pad is pulled low while the button is pressed.

use crate::config::{BOOTSEL_CS_PIN_INDEX, BOOTSEL_SETTLE_SPINS};
use crate::input::{GuardedButton, RawButtonProbe};
use critical_section::CriticalSection;
use embassy_rp::pac;
use embassy_rp::pac::io::vals::Oeover;

/// Register-level BOOTSEL probe. Wrap it in [`GuardedButton`] before use.
pub struct BootselProbe {
    _private: (),
}

/// The BOOTSEL button as a [`crate::input::ButtonInput`].
pub type BootselButton = GuardedButton<BootselProbe>;

impl BootselProbe {
    /// Only one instance may exist; it owns the QSPI CS pad override.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl RawButtonProbe for BootselProbe {
    fn probe(&mut self, _cs: CriticalSection<'_>) -> bool {
        read_qspi_cs_pressed()
    }
}

/// Create the guarded BOOTSEL button.
pub fn button() -> BootselButton {
    GuardedButton::new(BootselProbe::new())
}

#[inline(never)]
#[link_section = ".data.ram_func"]
fn read_qspi_cs_pressed() -> bool {
    let cs_ctrl = pac::IO_QSPI.gpio(BOOTSEL_CS_PIN_INDEX).ctrl();

    // Float chip-select so the button can pull it.
    cs_ctrl.modify(|w| w.set_oeover(Oeover::DISABLE));

    // No flash-resident delay helpers from here on.
    for _ in 0..BOOTSEL_SETTLE_SPINS {
        cortex_m::asm::nop();
    }

    // Bank 1 of SIO input covers the six QSPI pads.
    let level = pac::SIO.gpio_in(1).read() & (1 << BOOTSEL_CS_PIN_INDEX);

    // Hand CS back to the XIP controller before returning to flash.
    cs_ctrl.modify(|w| w.set_oeover(Oeover::NORMAL));

    level == 0
}
