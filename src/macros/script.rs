//! Macro scripts: fixed keystroke sequences ending in a sentinel step.

use crate::config::MAX_SCRIPT_STEPS;
use crate::error::ScriptError;
use crate::hid::keycodes::*;
use crate::hid::{KeyboardReport, Modifiers};

/// One logical keystroke: a key pressed with some modifiers held.
///
/// A step with `scancode == 0` is the end-of-script sentinel and is never sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyStep {
    pub modifier: Modifiers,
    pub scancode: u8,
}

impl KeyStep {
    pub const SENTINEL: KeyStep = KeyStep::new(Modifiers::empty(), 0);

    pub const fn new(modifier: Modifiers, scancode: u8) -> Self {
        Self { modifier, scancode }
    }

    /// Unmodified key.
    pub const fn key(scancode: u8) -> Self {
        Self::new(Modifiers::empty(), scancode)
    }

    /// Key with left shift held.
    pub const fn shifted(scancode: u8) -> Self {
        Self::new(Modifiers::LEFT_SHIFT, scancode)
    }

    pub const fn is_sentinel(&self) -> bool {
        self.scancode == 0
    }

    /// The key-down report for this step.
    pub const fn report(&self) -> KeyboardReport {
        KeyboardReport::key_down(self.modifier, self.scancode)
    }
}

/// An immutable keystroke sequence.
///
/// Lookups never run past the first sentinel, the end of the slice, or
/// [`MAX_SCRIPT_STEPS`], so a script without a sentinel still terminates.
#[derive(Clone, Copy, Debug)]
pub struct MacroScript<'a> {
    steps: &'a [KeyStep],
}

impl<'a> MacroScript<'a> {
    pub const fn new(steps: &'a [KeyStep]) -> Self {
        Self { steps }
    }

    /// The real (non-sentinel) step at `index`, or `None` at/after the end.
    pub fn step(&self, index: usize) -> Option<KeyStep> {
        if index >= MAX_SCRIPT_STEPS {
            return None;
        }
        // A sentinel earlier than `index` ends the script too.
        let end = self.len();
        if index < end {
            Some(self.steps[index])
        } else {
            None
        }
    }

    /// Number of real steps a playback will type.
    pub fn len(&self) -> usize {
        self.steps
            .iter()
            .take(MAX_SCRIPT_STEPS)
            .position(KeyStep::is_sentinel)
            .unwrap_or_else(|| self.steps.len().min(MAX_SCRIPT_STEPS))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check the sentinel is present and within the step bound.
    ///
    /// Returns the number of real steps.
    pub fn validate(&self) -> Result<usize, ScriptError> {
        let bounded = &self.steps[..self.steps.len().min(MAX_SCRIPT_STEPS + 1)];
        match bounded.iter().position(KeyStep::is_sentinel) {
            Some(n) => Ok(n),
            None if self.steps.len() > MAX_SCRIPT_STEPS => Err(ScriptError::TooLong),
            None => Err(ScriptError::MissingSentinel),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = KeyStep> + 'a {
        let steps = self.steps;
        let len = self.len();
        steps[..len].iter().copied()
    }
}

/// Types `if err != nil {⏎return err⏎}⏎` on a host using the JIS 106 layout.
///
/// On JIS, shifted `-` is `=`, shifted `[`-position (0x30) is `{` and
/// shifted 0x31 is `}`.
pub const IFERR_JIS: MacroScript<'static> = MacroScript::new(IFERR_JIS_STEPS);

const IFERR_JIS_STEPS: &[KeyStep] = &[
    KeyStep::key(KEY_I),
    KeyStep::key(KEY_F),
    KeyStep::key(KEY_SPACE),
    KeyStep::key(KEY_E),
    KeyStep::key(KEY_R),
    KeyStep::key(KEY_R),
    KeyStep::key(KEY_SPACE),
    KeyStep::shifted(KEY_1),
    KeyStep::shifted(KEY_MINUS),
    KeyStep::key(KEY_SPACE),
    KeyStep::key(KEY_N),
    KeyStep::key(KEY_I),
    KeyStep::key(KEY_L),
    KeyStep::key(KEY_SPACE),
    KeyStep::shifted(KEY_RIGHT_BRACKET),
    KeyStep::key(KEY_ENTER),
    KeyStep::key(KEY_R),
    KeyStep::key(KEY_E),
    KeyStep::key(KEY_T),
    KeyStep::key(KEY_U),
    KeyStep::key(KEY_R),
    KeyStep::key(KEY_N),
    KeyStep::key(KEY_SPACE),
    KeyStep::key(KEY_E),
    KeyStep::key(KEY_R),
    KeyStep::key(KEY_R),
    KeyStep::key(KEY_ENTER),
    KeyStep::shifted(KEY_BACKSLASH),
    KeyStep::key(KEY_ENTER),
    KeyStep::SENTINEL,
];
