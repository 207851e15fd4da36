//! HID report types and the report-emission seam.

pub mod keyboard;
pub mod keycodes;


pub use keyboard::{HostLeds, KeyboardReport, Modifiers};

/// Where keyboard reports go: the USB HID IN endpoint on target, a
/// recorder in tests.
pub trait ReportSink {
    /// `true` only while the HID interface is idle and can take a report.
    fn hid_ready(&self) -> bool;

    /// Hand a report to the transport.
    ///
    /// Returns `false` if it was not accepted; the caller keeps the report
    /// and retries on a later tick. `true` means handed off, not delivered.
    fn send_keyboard_report(&mut self, report: &KeyboardReport) -> bool;
}
