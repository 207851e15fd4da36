//! bootkey firmware entry point.
//!
//! Initialises the RP2040, brings up USB, then runs the cooperative
//! keyboard task: every `TICK_MS` it drains USB lifecycle events and
//! advances the driver by one tick.
//!
//! Task layout:
//! - `usb_task`    : embassy-usb device state machine, remote wakeup
//! - `writer_task` : keyboard IN endpoint writer
//! - `main`        : button, macro player and status LED

#![no_std]
#![no_main]

use bootkey::config;
use bootkey::input::bootsel;
use bootkey::macros::{MacroPlayer, IFERR_JIS};
use bootkey::status::StatusIndicator;
use bootkey::usb::hid_device::{self, KeyboardWriter, UsbDriver, UsbKeyboardLink};
use bootkey::{Error, TaskDriver};
use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::{Driver, InterruptHandler};
use embassy_time::{Duration, Instant, Ticker};
use embassy_usb::UsbDevice;
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => InterruptHandler<USB>;
});

#[embassy_executor::task]
async fn usb_task(device: UsbDevice<'static, UsbDriver>) -> ! {
    hid_device::run_usb_device(device).await
}

#[embassy_executor::task]
async fn writer_task(keyboard: KeyboardWriter) -> ! {
    hid_device::hid_writer_task(keyboard).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("bootkey v{} starting", env!("CARGO_PKG_VERSION"));

    // Playback stops at the step bound either way; just report it.
    match IFERR_JIS.validate() {
        Ok(steps) => info!("Macro: {} steps", steps),
        Err(e) => warn!("Macro: {}", Error::from(e)),
    }

    // - USB ---------------------------------------------------------
    let usb = hid_device::init(Driver::new(p.USB, Irqs));
    unwrap!(spawner.spawn(usb_task(usb.device)));
    unwrap!(spawner.spawn(writer_task(usb.keyboard_writer)));

    // - Keyboard task -----------------------------------------------
    let led = Output::new(p.PIN_25, Level::Low);
    let mut driver = TaskDriver::new(MacroPlayer::new(IFERR_JIS), StatusIndicator::new(led));
    let mut button = bootsel::button();
    let mut link = UsbKeyboardLink::new();

    let mut ticker = Ticker::every(Duration::from_millis(config::TICK_MS));
    info!("Ready - press BOOTSEL to type the macro");

    loop {
        while let Some(event) = hid_device::next_device_event() {
            driver.handle_event(event);
        }
        driver.tick(Instant::now().as_millis(), &mut button, &mut link);
        ticker.next().await;
    }
}
