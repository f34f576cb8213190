//! Machine mode and tick events
//!
//! The mode controller decides each tick whether the sequencer may run.

pub mod events;
pub mod mode;

pub use events::Event;
pub use mode::{Dispatch, Mode, ModeController, ModeEvent};
