//! Operator-facing status and the read-only snapshot

use core::fmt;

use crate::sequence::StepKind;
use crate::state::Mode;

/// Status line shown to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusMessage {
    #[default]
    None,
    /// A strap detector sees no strap
    NoStrap,
    /// Soft recovery after a stall, with the attempt number
    Retry(u8),
    /// Hard stop after repeated stalls
    Stopped,
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::None => Ok(()),
            StatusMessage::NoStrap => f.write_str("NO STRAP"),
            StatusMessage::Retry(n) => write!(f, "RUN RESET {}", n),
            StatusMessage::Stopped => f.write_str("STOPPED"),
        }
    }
}

/// Read-only projection of the machine for displays and logs
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub step_index: u8,
    pub step: StepKind,
    pub step_name: &'static str,
    pub running: bool,
    pub mode: Mode,
    /// Calmed pressure [bar]
    pub pressure_bar: f32,
    /// Force [N]
    pub force: i32,
    /// Force gauge position, 0..=11
    pub gauge: u8,
    pub stall_count: u8,
    pub short_counter: i32,
    pub long_counter: i32,
    /// Cooldown left, rounded up to whole seconds
    pub cooldown_remaining_s: u32,
    pub status: StatusMessage,
    /// Valve states, see [`crate::rig::Valves::bitmask`]
    pub valves: u16,
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn test_status_text() {
        assert_eq!(StatusMessage::None.to_string(), "");
        assert_eq!(StatusMessage::NoStrap.to_string(), "NO STRAP");
        assert_eq!(StatusMessage::Retry(2).to_string(), "RUN RESET 2");
        assert_eq!(StatusMessage::Stopped.to_string(), "STOPPED");
    }
}
