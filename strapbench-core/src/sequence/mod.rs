//! Step catalogue and sequencer
//!
//! A step is one stage of the strapping cycle with an entry action, a
//! per-tick action and a completion latch. The sequencer owns the fixed
//! ordered list and the current position.

pub mod sequencer;
pub mod step;

pub use sequencer::Sequencer;
pub use step::{Step, StepContext, StepKind, StepReport, STEP_COUNT};
