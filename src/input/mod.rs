//! Physical button input: sampling and press detection.
//!
//! The core only sees [`ButtonInput`], a side-effect-free boolean query.
//! Hardware that must be read with interrupts masked implements
//! [`RawButtonProbe`] and is wrapped in [`GuardedButton`], which owns the
//! critical section for the duration of the read.

pub mod edge;

#[cfg(feature = "embedded")]
pub mod bootsel;

use critical_section::CriticalSection;

pub use edge::{detect_edge, EdgeDetector};

/// Instantaneous button state, `true` while pressed.
pub trait ButtonInput {
    fn read_button(&mut self) -> bool;
}

/// Register-level button read that is only sound with interrupts masked.
///
/// The `CriticalSection` token proves the caller holds the section.
pub trait RawButtonProbe {
    fn probe(&mut self, cs: CriticalSection<'_>) -> bool;
}

/// Runs a [`RawButtonProbe`] inside `critical_section::with`, so the
/// section is released on every exit path of the read.
pub struct GuardedButton<P> {
    probe: P,
}

impl<P: RawButtonProbe> GuardedButton<P> {
    pub const fn new(probe: P) -> Self {
        Self { probe }
    }
}

impl<P: RawButtonProbe> ButtonInput for GuardedButton<P> {
    fn read_button(&mut self) -> bool {
        critical_section::with(|cs| self.probe.probe(cs))
    }
}
