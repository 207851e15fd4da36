//! USB HID keyboard device.
//!
//! Builds the Embassy USB stack on the RP2040 USB controller with a single
//! boot-keyboard interface, and bridges it to the task driver:
//!
//! - lifecycle callbacks become [`DeviceEvent`]s on a small queue
//! - keyboard reports travel through a one-slot channel to the endpoint
//!   writer task; [`UsbKeyboardLink::hid_ready`] is only true while that
//!   slot is empty, no write is in flight and the bus is configured and awake
//! - remote wakeup requests are recorded in [`LinkState`] and a signal
//!   wakes the device task to serve them

use crate::config;
use crate::error::Error;
use crate::hid::keyboard::KEYBOARD_REPORT_SIZE;
use crate::hid::{HostLeds, KeyboardReport, ReportSink};
use crate::task::{DeviceEvent, UsbLink};
use crate::usb::link_state::LinkState;
use embassy_futures::select::{select, Either};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, ReportId, RequestHandler, State};
use embassy_usb::control::OutResponse;
use embassy_usb::{Builder, Config, Handler, UsbDevice};
use static_cell::StaticCell;
use usbd_hid::descriptor::{KeyboardReport as BootKeyboardDescriptor, SerializedDescriptor};

pub type UsbDriver = Driver<'static, USB>;
pub type KeyboardWriter = HidWriter<'static, UsbDriver, KEYBOARD_REPORT_SIZE>;

static KB_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static DEVICE_HANDLER: StaticCell<DeviceEventHandler> = StaticCell::new();
static HOST_LED_HANDLER: StaticCell<HostLedHandler> = StaticCell::new();

static DEVICE_EVENTS: Channel<CriticalSectionRawMutex, DeviceEvent, 4> = Channel::new();
static KEYBOARD_REPORTS: Channel<CriticalSectionRawMutex, KeyboardReport, 1> = Channel::new();
static REMOTE_WAKEUP: Signal<CriticalSectionRawMutex, ()> = Signal::new();

static LINK: LinkState = LinkState::new();

/// Forwards embassy-usb bus callbacks to [`LINK`] and queues the resulting
/// [`DeviceEvent`]s.
struct DeviceEventHandler;

impl Handler for DeviceEventHandler {
    fn enabled(&mut self, enabled: bool) {
        publish(LINK.on_enabled(enabled));
    }

    fn reset(&mut self) {
        publish(LINK.on_reset());
    }

    fn configured(&mut self, configured: bool) {
        publish(LINK.on_configured(configured));
    }

    fn remote_wakeup_enabled(&mut self, enabled: bool) {
        info!("USB: host {} remote wakeup", if enabled { "enabled" } else { "disabled" });
        LINK.on_remote_wakeup_enabled(enabled);
    }

    fn suspended(&mut self, suspended: bool) {
        publish(LINK.on_suspended(suspended));
    }
}

fn publish(event: Option<DeviceEvent>) {
    let Some(event) = event else {
        return;
    };
    if DEVICE_EVENTS.try_send(event).is_err() {
        warn!("USB: event queue full, dropped {}", event);
    }
}

/// HID class control requests: host LED output reports.
struct HostLedHandler {
    leds: HostLeds,
}

impl RequestHandler for HostLedHandler {
    fn get_report(&mut self, _id: ReportId, _buf: &mut [u8]) -> Option<usize> {
        // Stalls GET_REPORT; the host polls the interrupt endpoint instead.
        None
    }

    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        let ReportId::Out(_) = id else {
            return OutResponse::Rejected;
        };
        match HostLeds::from_output_report(data) {
            Some(leds) => {
                if leds != self.leds {
                    info!("Host LEDs: {}", leds);
                    self.leds = leds;
                }
                OutResponse::Accepted
            }
            None => OutResponse::Rejected,
        }
    }
}

/// Build result containing the USB device runner and the keyboard writer.
pub struct UsbHidDevice {
    pub device: UsbDevice<'static, UsbDriver>,
    pub keyboard_writer: KeyboardWriter,
}

/// Initialise the USB stack and create the keyboard interface.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(driver: UsbDriver) -> UsbHidDevice {
    // USB device-level configuration.
    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = config::USB_MAX_POWER_MA;
    usb_config.max_packet_size_0 = 64;
    usb_config.supports_remote_wakeup = true;

    // Allocate static descriptor buffers.
    let config_desc = USB_CONFIG_DESC.init([0u8; 256]);
    let bos_desc = USB_BOS_DESC.init([0u8; 256]);
    let msos_desc = USB_MSOS_DESC.init([0u8; 256]);
    let ctrl_buf = USB_CTRL_BUF.init([0u8; 64]);

    let mut builder = Builder::new(
        driver,
        usb_config,
        config_desc,
        bos_desc,
        msos_desc,
        ctrl_buf,
    );

    let device_handler = DEVICE_HANDLER.init(DeviceEventHandler);
    builder.handler(device_handler);

    let kb_state = KB_STATE.init(State::new());
    let led_handler = HOST_LED_HANDLER.init(HostLedHandler {
        leds: HostLeds::empty(),
    });
    let kb_config = HidConfig {
        report_descriptor: BootKeyboardDescriptor::desc(),
        request_handler: Some(led_handler),
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: KEYBOARD_REPORT_SIZE as u16,
    };
    let keyboard_writer = HidWriter::new(&mut builder, kb_state, kb_config);

    let device = builder.build();

    info!(
        "USB HID keyboard initialised ({=u16:04x}:{=u16:04x})",
        config::USB_VID,
        config::USB_PID
    );

    UsbHidDevice {
        device,
        keyboard_writer,
    }
}

/// Next queued lifecycle event, if any. Never blocks.
pub fn next_device_event() -> Option<DeviceEvent> {
    DEVICE_EVENTS.try_receive().ok()
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
///
/// Handles enumeration and endpoint servicing; while suspended it waits
/// for either the host to resume the bus or a remote wakeup request.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    loop {
        device.run_until_suspend().await;
        loop {
            match select(device.wait_resume(), REMOTE_WAKEUP.wait()).await {
                Either::First(()) => break,
                // The signal may be left over from an earlier period; only a
                // request recorded during this suspend counts.
                Either::Second(()) => {
                    if !LINK.take_remote_wakeup() {
                        continue;
                    }
                    if device.remote_wakeup().await.is_err() {
                        warn!("USB: {}", Error::RemoteWakeup);
                    }
                    break;
                }
            }
        }
    }
}

/// Keyboard endpoint writer - drains the report slot into the IN endpoint.
///
/// A failed write is retried once the endpoint is enabled again, so
/// reports are never dropped.
pub async fn hid_writer_task(mut keyboard: KeyboardWriter) -> ! {
    info!("HID writer task started - waiting for reports");

    let mut buf = [0u8; KEYBOARD_REPORT_SIZE];

    loop {
        let report = KEYBOARD_REPORTS.receive().await;
        LINK.begin_write();

        let n = report.serialize(&mut buf);
        while keyboard.write(&buf[..n]).await.is_err() {
            warn!("USB keyboard write failed: {}", Error::Usb);
            keyboard.ready().await;
        }

        LINK.end_write();
    }
}

/// The task driver's view of the USB keyboard.
pub struct UsbKeyboardLink {
    _private: (),
}

impl UsbKeyboardLink {
    /// Only one link may exist; it is the sole producer of keyboard reports.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl ReportSink for UsbKeyboardLink {
    fn hid_ready(&self) -> bool {
        LINK.is_ready(KEYBOARD_REPORTS.is_empty())
    }

    fn send_keyboard_report(&mut self, report: &KeyboardReport) -> bool {
        KEYBOARD_REPORTS.try_send(*report).is_ok()
    }
}

impl UsbLink for UsbKeyboardLink {
    fn request_remote_wakeup(&mut self) {
        if LINK.request_remote_wakeup() {
            REMOTE_WAKEUP.signal(());
        }
    }
}
