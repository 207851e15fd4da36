//! Macro playback state machine.
//!
//! Each real step of the script becomes two reports: a key-down carrying
//! the step's modifier and scancode, then an all-zero release. The player
//! emits at most one report per [`MacroPlayer::poll`] and only while the
//! sink reports ready; otherwise it holds its position, so a report is
//! delayed but never skipped or repeated.

use crate::hid::{KeyboardReport, ReportSink};
use crate::macros::script::MacroScript;

/// Player state. The cursor always points at a real step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayerState {
    /// Nothing to send until the next trigger.
    Idle,
    /// Key-down for `cursor` is next.
    Armed { cursor: usize },
    /// Key-down for `cursor` was sent; its release is owed.
    KeyDownSent { cursor: usize },
}

/// What to do with an outstanding key-down when playback is re-triggered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RetriggerPolicy {
    /// Send the owed release before the restarted run's first key-down.
    #[default]
    ReleaseFirst,
    /// Restart immediately; the host sees the held key until the next release.
    Restart,
}

/// Kind of report a successful poll emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Emitted {
    /// Key-down for the step at `cursor`.
    KeyDown { cursor: usize },
    /// Release completing the step at `cursor`.
    KeyUp { cursor: usize },
    /// Release owed by a re-triggered run.
    ForcedRelease,
}

pub struct MacroPlayer<'a> {
    script: MacroScript<'a>,
    state: PlayerState,
    policy: RetriggerPolicy,
    release_owed: bool,
}

impl<'a> MacroPlayer<'a> {
    pub const fn new(script: MacroScript<'a>) -> Self {
        Self::with_policy(script, RetriggerPolicy::ReleaseFirst)
    }

    pub const fn with_policy(script: MacroScript<'a>, policy: RetriggerPolicy) -> Self {
        Self {
            script,
            state: PlayerState::Idle,
            policy,
            release_owed: false,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == PlayerState::Idle && !self.release_owed
    }

    /// Press-began: restart the script from its first step.
    pub fn trigger(&mut self) {
        match self.state {
            PlayerState::KeyDownSent { cursor } => {
                info!("Macro: restarted at step {}", cursor);
                if self.policy == RetriggerPolicy::ReleaseFirst {
                    self.release_owed = true;
                }
            }
            PlayerState::Armed { cursor } => info!("Macro: restarted at step {}", cursor),
            PlayerState::Idle => info!("Macro: started ({} steps)", self.script.len()),
        }

        self.state = if self.script.step(0).is_some() {
            PlayerState::Armed { cursor: 0 }
        } else {
            PlayerState::Idle
        };
    }

    /// The report the next successful poll would send, if any.
    pub fn pending_report(&self) -> Option<KeyboardReport> {
        if self.release_owed {
            return Some(KeyboardReport::empty());
        }
        match self.state {
            PlayerState::Idle => None,
            PlayerState::Armed { cursor } => self.script.step(cursor).map(|s| s.report()),
            PlayerState::KeyDownSent { .. } => Some(KeyboardReport::empty()),
        }
    }

    /// Advance by at most one report.
    pub fn poll<S: ReportSink + ?Sized>(&mut self, sink: &mut S) -> Option<Emitted> {
        let report = self.pending_report()?;

        if !sink.hid_ready() || !sink.send_keyboard_report(&report) {
            return None;
        }

        if self.release_owed {
            self.release_owed = false;
            debug!("Macro: released held key before restart");
            return Some(Emitted::ForcedRelease);
        }

        match self.state {
            PlayerState::Armed { cursor } => {
                self.state = PlayerState::KeyDownSent { cursor };
                Some(Emitted::KeyDown { cursor })
            }
            PlayerState::KeyDownSent { cursor } => {
                let next = cursor + 1;
                self.state = if self.script.step(next).is_some() {
                    PlayerState::Armed { cursor: next }
                } else {
                    info!("Macro: finished");
                    PlayerState::Idle
                };
                Some(Emitted::KeyUp { cursor })
            }
            // `pending_report` returned None for Idle above.
            PlayerState::Idle => None,
        }
    }
}
