//! Events raised during a control tick
//!
//! The engine does not log. It reports what happened through these
//! events and the firmware decides what to print or forward.

use crate::sequence::StepKind;

/// Something the control loop did or observed this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// A step ran its entry action
    StepEntered(StepKind),
    /// The return step finished and the cycle counters were bumped
    CycleCompleted { short: i32, long: i32 },
    /// A strap detector lost the strap
    MaterialMissing,
    /// Both strap detectors see strap again
    MaterialRestored,
    /// Stall detected, soft recovery number `attempt` started
    StallRecovery { attempt: u8 },
    /// Stall escalation reached the terminal tier
    HardStop,
    /// Reset mode resolved into auto (`true`) or step mode
    ResetResolved { auto: bool },
    /// Pause step began a cooldown of this many seconds
    CooldownStarted { seconds: u32 },
    /// Cooldown elapsed, cycle count restarts
    CooldownFinished,
    /// Short counter cleared from the panel
    ShortCounterCleared,
    /// Long counter cleared by holding the reset button
    LongCounterCleared,
    /// Operator reset the machine
    MachineReset,
}
