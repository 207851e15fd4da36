//! USB link bookkeeping.
//!
//! Shared by the bus callbacks (writer), the endpoint writer task and the
//! keyboard task (readers). Only plain atomic loads and stores are used,
//! which thumbv6m supports; each flag has a single writer.

use crate::task::DeviceEvent;
use core::sync::atomic::{AtomicBool, Ordering};

pub struct LinkState {
    configured: AtomicBool,
    suspended: AtomicBool,
    remote_wakeup_enabled: AtomicBool,
    write_in_flight: AtomicBool,
    wakeup_requested: AtomicBool,
}

impl Default for LinkState {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkState {
    pub const fn new() -> Self {
        Self {
            configured: AtomicBool::new(false),
            suspended: AtomicBool::new(false),
            remote_wakeup_enabled: AtomicBool::new(false),
            write_in_flight: AtomicBool::new(false),
            wakeup_requested: AtomicBool::new(false),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.configured.load(Ordering::Relaxed)
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Relaxed)
    }

    // - Bus callbacks ---------------------------------------------------

    /// Controller enabled or disabled (cable pulled, VBUS lost).
    pub fn on_enabled(&self, enabled: bool) -> Option<DeviceEvent> {
        if enabled {
            return None;
        }
        self.clear_bus_state();
        self.set_configured(false)
    }

    /// Bus reset. The stack leaves suspend without a resume callback here.
    pub fn on_reset(&self) -> Option<DeviceEvent> {
        debug!("USB: bus reset");
        self.clear_bus_state();
        self.set_configured(false)
    }

    pub fn on_configured(&self, configured: bool) -> Option<DeviceEvent> {
        self.set_configured(configured)
    }

    pub fn on_remote_wakeup_enabled(&self, enabled: bool) {
        self.remote_wakeup_enabled.store(enabled, Ordering::Relaxed);
    }

    /// Suspend or resume. Both start a new period, so an unserved wakeup
    /// request from before is dropped.
    pub fn on_suspended(&self, suspended: bool) -> Option<DeviceEvent> {
        self.suspended.store(suspended, Ordering::Relaxed);
        self.wakeup_requested.store(false, Ordering::Relaxed);
        // Bus idle before enumeration is not a suspend of a mounted device.
        if !self.is_configured() {
            return None;
        }
        Some(if suspended {
            DeviceEvent::Suspended {
                remote_wakeup_allowed: self.remote_wakeup_enabled.load(Ordering::Relaxed),
            }
        } else {
            DeviceEvent::Resumed
        })
    }

    fn clear_bus_state(&self) {
        self.suspended.store(false, Ordering::Relaxed);
        self.remote_wakeup_enabled.store(false, Ordering::Relaxed);
        self.wakeup_requested.store(false, Ordering::Relaxed);
    }

    fn set_configured(&self, configured: bool) -> Option<DeviceEvent> {
        if self.is_configured() == configured {
            return None;
        }
        self.configured.store(configured, Ordering::Relaxed);
        Some(if configured {
            DeviceEvent::Mounted
        } else {
            DeviceEvent::Unmounted
        })
    }

    // - Endpoint writer -------------------------------------------------

    pub fn begin_write(&self) {
        self.write_in_flight.store(true, Ordering::Relaxed);
    }

    pub fn end_write(&self) {
        self.write_in_flight.store(false, Ordering::Relaxed);
    }

    /// Whether the keyboard task may hand over a report now.
    ///
    /// `slot_empty` is the state of the report queue feeding the writer.
    pub fn is_ready(&self, slot_empty: bool) -> bool {
        self.is_configured()
            && !self.is_suspended()
            && !self.write_in_flight.load(Ordering::Relaxed)
            && slot_empty
    }

    // - Remote wakeup ---------------------------------------------------

    /// Record a wakeup request. Ignored unless the bus is suspended.
    pub fn request_remote_wakeup(&self) -> bool {
        if !self.is_suspended() {
            return false;
        }
        self.wakeup_requested.store(true, Ordering::Relaxed);
        true
    }

    /// Consume a request made during the current suspend period.
    pub fn take_remote_wakeup(&self) -> bool {
        let requested = self.wakeup_requested.load(Ordering::Relaxed);
        if requested {
            self.wakeup_requested.store(false, Ordering::Relaxed);
        }
        requested
    }
}
