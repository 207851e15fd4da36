//! Fixed keystroke macros and their playback.
//!
//! A [`script::MacroScript`] is constant data; a [`player::MacroPlayer`]
//! walks it one report at a time on behalf of the task driver.

pub mod player;
pub mod script;

pub use player::{Emitted, MacroPlayer, PlayerState, RetriggerPolicy};
pub use script::{KeyStep, MacroScript, IFERR_JIS};
