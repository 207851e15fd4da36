//! USB Device subsystem - presents a boot keyboard to the host.
//!
//! The RP2040's built-in USB 1.1 Full-Speed controller is driven by
//! `embassy-usb`.  The device exposes one HID interface:
//!
//! - Interface 0: Keyboard (boot protocol, remote-wakeup capable)
//!
//! The keyboard task hands reports to the endpoint writer task through a
//! one-slot channel; see [`link_state`] for the readiness and wakeup
//! bookkeeping shared between them.

pub mod link_state;

#[cfg(feature = "embedded")]
pub mod hid_device;

pub use link_state::LinkState;
