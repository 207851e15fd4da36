//! Unified error type for bootkey.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (with the `defmt` feature) for on-target logging.

use core::fmt;

/// Top-level error type used across the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The compiled-in macro script is malformed.
    Script(ScriptError),

    /// USB endpoint write failed (endpoint disabled or bus reset).
    Usb,

    /// The host rejected or ignored a remote wakeup request.
    RemoteWakeup,
}

/// Problems found when validating a macro script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScriptError {
    /// The step slice ends without a sentinel step.
    MissingSentinel,
    /// No sentinel within the first `MAX_SCRIPT_STEPS` steps.
    TooLong,
}

// Convenience conversions

impl From<ScriptError> for Error {
    fn from(e: ScriptError) -> Self {
        Error::Script(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Script(e) => write!(f, "macro script: {e}"),
            Error::Usb => f.write_str("USB endpoint write failed"),
            Error::RemoteWakeup => f.write_str("remote wakeup failed"),
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::MissingSentinel => f.write_str("no end-of-script sentinel"),
            ScriptError::TooLong => f.write_str("sentinel beyond step bound"),
        }
    }
}
