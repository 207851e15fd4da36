//! Status LED - connection state as a blink pattern.
//!
//! - 250 ms  : device not mounted
//! - 1000 ms : device mounted
//! - 2500 ms : bus suspended
//!
//! While the button is held the LED is driven solid on.

use crate::config;
use embedded_hal::digital::OutputPin;

/// USB connection state as seen by the status LED.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    #[default]
    Unmounted,
    Mounted,
    Suspended,
}

impl ConnectionState {
    pub const fn blink_interval_ms(self) -> u64 {
        match self {
            ConnectionState::Unmounted => config::BLINK_NOT_MOUNTED_MS,
            ConnectionState::Mounted => config::BLINK_MOUNTED_MS,
            ConnectionState::Suspended => config::BLINK_SUSPENDED_MS,
        }
    }
}

/// Drives the LED from the connection state and button level.
pub struct StatusIndicator<L> {
    led: L,
    state: ConnectionState,
    led_on: bool,
    last_toggle_ms: u64,
}

impl<L: OutputPin> StatusIndicator<L> {
    pub fn new(led: L) -> Self {
        Self {
            led,
            state: ConnectionState::Unmounted,
            led_on: false,
            last_toggle_ms: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn led_on(&self) -> bool {
        self.led_on
    }

    /// Update the connection state; selects the blink interval.
    pub fn set_state(&mut self, state: ConnectionState) {
        if self.state == state {
            return;
        }
        info!("Status: {} -> {}", self.state, state);
        self.state = state;
    }

    /// Periodic update - call every tick.
    pub fn update(&mut self, now_ms: u64, button_held: bool) {
        if button_held {
            self.write(true);
            return;
        }

        let interval = self.state.blink_interval_ms();
        if now_ms.saturating_sub(self.last_toggle_ms) < interval {
            return;
        }
        self.last_toggle_ms = now_ms;
        self.write(!self.led_on);
    }

    /// A failed pin write is logged; the blink phase still advances.
    fn write(&mut self, on: bool) {
        let result = if on {
            self.led.set_high()
        } else {
            self.led.set_low()
        };
        if result.is_err() {
            warn!("Status: LED write failed (on = {})", on);
        }
        self.led_on = on;
    }

    /// Release the LED pin.
    pub fn into_inner(self) -> L {
        self.led
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    #[derive(Default)]
    struct MockLed {
        high: bool,
        writes: usize,
    }

    impl ErrorType for MockLed {
        type Error = Infallible;
    }

    impl OutputPin for MockLed {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    /// Timestamps at which the LED toggled, sampling every 10 ms.
    fn toggles(status: &mut StatusIndicator<MockLed>, from_ms: u64, until_ms: u64) -> Vec<u64> {
        let mut out = Vec::new();
        let mut now = from_ms;
        while now < until_ms {
            let before = status.led_on();
            status.update(now, false);
            if status.led_on() != before {
                out.push(now);
            }
            now += 10;
        }
        out
    }

    #[test]
    fn blink_intervals_per_state() {
        assert_eq!(ConnectionState::Unmounted.blink_interval_ms(), 250);
        assert_eq!(ConnectionState::Mounted.blink_interval_ms(), 1000);
        assert_eq!(ConnectionState::Suspended.blink_interval_ms(), 2500);
    }

    #[test]
    fn unmounted_blinks_fast() {
        let mut status = StatusIndicator::new(MockLed::default());
        assert_eq!(toggles(&mut status, 0, 1000), vec![250, 500, 750]);
    }

    #[test]
    fn mounted_blinks_once_per_second() {
        let mut status = StatusIndicator::new(MockLed::default());
        status.set_state(ConnectionState::Mounted);
        assert_eq!(toggles(&mut status, 0, 3010), vec![1000, 2000, 3000]);
    }

    #[test]
    fn suspended_blinks_slowly() {
        let mut status = StatusIndicator::new(MockLed::default());
        status.set_state(ConnectionState::Suspended);
        assert_eq!(toggles(&mut status, 0, 5010), vec![2500, 5000]);
    }

    #[test]
    fn held_button_forces_led_on() {
        let mut status = StatusIndicator::new(MockLed::default());
        status.set_state(ConnectionState::Mounted);
        for now in (0..3000).step_by(10) {
            status.update(now, true);
            assert!(status.led_on());
        }
        assert!(status.into_inner().high);
    }

    /// Pin whose writes always fail.
    #[derive(Default)]
    struct BrokenLed {
        attempts: usize,
    }

    #[derive(Debug)]
    struct PinFault;

    impl embedded_hal::digital::Error for PinFault {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    impl ErrorType for BrokenLed {
        type Error = PinFault;
    }

    impl OutputPin for BrokenLed {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.attempts += 1;
            Err(PinFault)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.attempts += 1;
            Err(PinFault)
        }
    }

    #[test]
    fn failed_led_writes_keep_the_blink_cadence() {
        let mut status = StatusIndicator::new(BrokenLed::default());
        let mut toggles = Vec::new();
        for now in (0..1000).step_by(10) {
            let before = status.led_on();
            status.update(now, false);
            if status.led_on() != before {
                toggles.push(now);
            }
        }
        assert_eq!(toggles, vec![250, 500, 750]);

        status.update(1000, true);
        assert!(status.led_on());
        assert_eq!(status.into_inner().attempts, 4);
    }

    #[test]
    fn set_state_is_idempotent() {
        let mut status = StatusIndicator::new(MockLed::default());
        status.set_state(ConnectionState::Unmounted);
        assert_eq!(status.state(), ConnectionState::Unmounted);
        status.set_state(ConnectionState::Mounted);
        status.set_state(ConnectionState::Mounted);
        assert_eq!(status.state(), ConnectionState::Mounted);
        assert_eq!(status.into_inner().writes, 0);
    }
}
