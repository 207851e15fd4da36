//! The cooperative keyboard task.
//!
//! [`TaskDriver::tick`] is one iteration of the firmware loop. Per tick:
//!
//! 1. sample the button exactly once
//! 2. run edge detection; a press restarts the macro and, while the bus is
//!    suspended, asks the host to wake up
//! 3. let the macro player emit at most one report
//! 4. update the status LED
//!
//! The USB stack itself is serviced elsewhere (its own task on target);
//! its lifecycle callbacks arrive as [`DeviceEvent`]s.

use crate::hid::ReportSink;
use crate::input::{ButtonInput, EdgeDetector};
use crate::macros::{Emitted, MacroPlayer};
use crate::status::{ConnectionState, StatusIndicator};
use embedded_hal::digital::OutputPin;

/// Device lifecycle notifications from the USB stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceEvent {
    Mounted,
    Unmounted,
    Suspended { remote_wakeup_allowed: bool },
    Resumed,
}

/// USB side of the task: report emission plus remote wakeup.
pub trait UsbLink: ReportSink {
    /// Ask the stack to signal resume to the host. Must not block.
    fn request_remote_wakeup(&mut self);
}

/// Result of one tick, for tests and tracing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickOutcome {
    pub press_began: bool,
    pub emitted: Option<Emitted>,
    pub wakeup_requested: bool,
}

pub struct TaskDriver<'a, L> {
    edge: EdgeDetector,
    player: MacroPlayer<'a>,
    status: StatusIndicator<L>,
    remote_wakeup_allowed: bool,
    wakeup_pending: bool,
}

impl<'a, L: OutputPin> TaskDriver<'a, L> {
    pub fn new(player: MacroPlayer<'a>, status: StatusIndicator<L>) -> Self {
        Self {
            edge: EdgeDetector::new(),
            player,
            status,
            remote_wakeup_allowed: false,
            wakeup_pending: false,
        }
    }

    pub fn player(&self) -> &MacroPlayer<'a> {
        &self.player
    }

    pub fn status(&self) -> &StatusIndicator<L> {
        &self.status
    }

    pub fn connection(&self) -> ConnectionState {
        self.status.state()
    }

    /// Apply a lifecycle callback. Does not touch macro playback.
    pub fn handle_event(&mut self, event: DeviceEvent) {
        info!("USB: {}", event);
        match event {
            DeviceEvent::Mounted | DeviceEvent::Resumed => {
                self.wakeup_pending = false;
                self.status.set_state(ConnectionState::Mounted);
            }
            DeviceEvent::Unmounted => {
                self.wakeup_pending = false;
                self.remote_wakeup_allowed = false;
                self.status.set_state(ConnectionState::Unmounted);
            }
            DeviceEvent::Suspended {
                remote_wakeup_allowed,
            } => {
                self.remote_wakeup_allowed = remote_wakeup_allowed;
                self.status.set_state(ConnectionState::Suspended);
            }
        }
    }

    /// One loop iteration.
    pub fn tick<B, U>(&mut self, now_ms: u64, button: &mut B, usb: &mut U) -> TickOutcome
    where
        B: ButtonInput + ?Sized,
        U: UsbLink + ?Sized,
    {
        let mut outcome = TickOutcome::default();

        let pressed = button.read_button();
        if self.edge.update(pressed) {
            info!("Button: press at {} ms", now_ms);
            outcome.press_began = true;
            self.player.trigger();
            outcome.wakeup_requested = self.maybe_wake_host(usb);
        }

        outcome.emitted = self.player.poll(usb);
        if let Some(emitted) = outcome.emitted {
            trace!("HID: {}", emitted);
        }

        self.status.update(now_ms, pressed);
        outcome
    }

    fn maybe_wake_host<U: UsbLink + ?Sized>(&mut self, usb: &mut U) -> bool {
        if self.status.state() != ConnectionState::Suspended || self.wakeup_pending {
            return false;
        }
        if !self.remote_wakeup_allowed {
            info!("USB: suspended, host disallows remote wakeup");
            return false;
        }
        info!("USB: requesting remote wakeup");
        usb.request_remote_wakeup();
        self.wakeup_pending = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::keycodes::KEY_A;
    use crate::hid::KeyboardReport;
    use crate::macros::{KeyStep, MacroScript};
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    static ONE_KEY: [KeyStep; 2] = [KeyStep::key(KEY_A), KeyStep::SENTINEL];

    struct NullLed;

    impl ErrorType for NullLed {
        type Error = Infallible;
    }

    impl OutputPin for NullLed {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    struct Level(bool);

    impl ButtonInput for Level {
        fn read_button(&mut self) -> bool {
            self.0
        }
    }

    #[derive(Default)]
    struct Link {
        ready: bool,
        sent: usize,
        wakeups: usize,
    }

    impl ReportSink for Link {
        fn hid_ready(&self) -> bool {
            self.ready
        }

        fn send_keyboard_report(&mut self, _report: &KeyboardReport) -> bool {
            self.sent += 1;
            true
        }
    }

    impl UsbLink for Link {
        fn request_remote_wakeup(&mut self) {
            self.wakeups += 1;
        }
    }

    fn driver() -> TaskDriver<'static, NullLed> {
        TaskDriver::new(
            MacroPlayer::new(MacroScript::new(&ONE_KEY)),
            StatusIndicator::new(NullLed),
        )
    }

    /// Release then press, returning the press tick's outcome.
    fn press(driver: &mut TaskDriver<'static, NullLed>, link: &mut Link, now: u64) -> TickOutcome {
        driver.tick(now, &mut Level(false), link);
        driver.tick(now + 10, &mut Level(true), link)
    }

    #[test]
    fn lifecycle_events_drive_connection_state() {
        let mut driver = driver();
        assert_eq!(driver.connection(), ConnectionState::Unmounted);

        driver.handle_event(DeviceEvent::Mounted);
        assert_eq!(driver.connection(), ConnectionState::Mounted);

        driver.handle_event(DeviceEvent::Suspended {
            remote_wakeup_allowed: true,
        });
        assert_eq!(driver.connection(), ConnectionState::Suspended);

        driver.handle_event(DeviceEvent::Resumed);
        assert_eq!(driver.connection(), ConnectionState::Mounted);

        driver.handle_event(DeviceEvent::Unmounted);
        assert_eq!(driver.connection(), ConnectionState::Unmounted);
    }

    #[test]
    fn events_do_not_touch_playback() {
        let mut driver = driver();
        let mut link = Link::default();
        press(&mut driver, &mut link, 0);
        assert!(!driver.player().is_idle());

        driver.handle_event(DeviceEvent::Suspended {
            remote_wakeup_allowed: false,
        });
        driver.handle_event(DeviceEvent::Unmounted);
        driver.handle_event(DeviceEvent::Mounted);
        assert!(!driver.player().is_idle());
    }

    #[test]
    fn press_while_suspended_requests_wakeup_once() {
        let mut driver = driver();
        let mut link = Link::default();
        driver.handle_event(DeviceEvent::Suspended {
            remote_wakeup_allowed: true,
        });

        let outcome = press(&mut driver, &mut link, 0);
        assert!(outcome.press_began);
        assert!(outcome.wakeup_requested);
        assert_eq!(link.wakeups, 1);

        // Still suspended: a second press does not repeat the request.
        let outcome = press(&mut driver, &mut link, 100);
        assert!(outcome.press_began);
        assert!(!outcome.wakeup_requested);
        assert_eq!(link.wakeups, 1);

        // A new suspend period may request again.
        driver.handle_event(DeviceEvent::Resumed);
        driver.handle_event(DeviceEvent::Suspended {
            remote_wakeup_allowed: true,
        });
        press(&mut driver, &mut link, 200);
        assert_eq!(link.wakeups, 2);
    }

    #[test]
    fn wakeup_not_requested_when_disallowed() {
        let mut driver = driver();
        let mut link = Link::default();
        driver.handle_event(DeviceEvent::Suspended {
            remote_wakeup_allowed: false,
        });
        let outcome = press(&mut driver, &mut link, 0);
        assert!(outcome.press_began);
        assert!(!outcome.wakeup_requested);
        assert_eq!(link.wakeups, 0);
    }

    #[test]
    fn wakeup_not_requested_while_mounted() {
        let mut driver = driver();
        let mut link = Link {
            ready: true,
            ..Link::default()
        };
        driver.handle_event(DeviceEvent::Mounted);
        let outcome = press(&mut driver, &mut link, 0);
        assert!(!outcome.wakeup_requested);
        assert_eq!(outcome.emitted, Some(Emitted::KeyDown { cursor: 0 }));
        assert_eq!(link.wakeups, 0);
    }

    #[test]
    fn suspended_playback_waits_for_readiness() {
        let mut driver = driver();
        let mut link = Link::default();
        driver.handle_event(DeviceEvent::Suspended {
            remote_wakeup_allowed: true,
        });
        press(&mut driver, &mut link, 0);
        for t in 0..5 {
            driver.tick(100 + t * 10, &mut Level(false), &mut link);
        }
        assert_eq!(link.sent, 0);

        driver.handle_event(DeviceEvent::Resumed);
        link.ready = true;
        let first = driver.tick(200, &mut Level(false), &mut link);
        let second = driver.tick(210, &mut Level(false), &mut link);
        assert_eq!(first.emitted, Some(Emitted::KeyDown { cursor: 0 }));
        assert_eq!(second.emitted, Some(Emitted::KeyUp { cursor: 0 }));
        assert!(driver.player().is_idle());
    }
}
