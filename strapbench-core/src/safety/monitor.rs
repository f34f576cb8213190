//! Supervisory monitor implementation
//!
//! Stall escalation: a deadline runs while the machine is running and is
//! refreshed whenever it is stopped, a step switches, or a cooldown is in
//! progress. Each expiry raises the stall count. The first two expiries
//! ask for a soft recovery; the third is a hard stop. The count survives
//! soft recoveries and only clears on an operator reset or a completed
//! cycle.

use crate::timer::Delay;

/// Stall count at which the rig stops for good
pub const HARD_STOP_TIER: u8 = 3;

/// Stall escalation tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StallTier {
    Idle,
    Tier1,
    Tier2,
    /// Terminal until an operator reset
    HardStop,
}

/// What the control loop must do about a stall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StallAction {
    None,
    /// Reset to idle and resume automatically
    SoftRecovery { attempt: u8 },
    /// Stop, close main air and wait for the operator
    HardStop,
}

/// Edge in strap presence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MaterialChange {
    Missing,
    Restored,
}

/// Material and stall supervision
#[derive(Debug, Clone)]
pub struct SupervisoryMonitor {
    /// Stall deadline baseline
    deadline: Delay,
    /// Time a step may take before it counts as stalled
    stall_timeout_ms: u32,
    /// Expiries since the last operator reset or completed cycle
    stall_count: u8,
    /// Strap missing at the last check
    material_missing: bool,
}

impl SupervisoryMonitor {
    pub fn new(stall_timeout_ms: u32) -> Self {
        Self {
            deadline: Delay::new(),
            stall_timeout_ms,
            stall_count: 0,
            material_missing: false,
        }
    }

    /// Update strap presence, reporting edges
    pub fn check_material(&mut self, present: bool) -> Option<MaterialChange> {
        match (self.material_missing, present) {
            (false, false) => {
                self.material_missing = true;
                Some(MaterialChange::Missing)
            }
            (true, true) => {
                self.material_missing = false;
                Some(MaterialChange::Restored)
            }
            _ => None,
        }
    }

    pub fn material_missing(&self) -> bool {
        self.material_missing
    }

    /// Forget the last strap state so the next check reports afresh
    pub fn reset_material(&mut self) {
        self.material_missing = false;
    }

    /// Restart the stall deadline at `now_ms`
    pub fn refresh_deadline(&mut self, now_ms: u32) {
        self.deadline.reset(now_ms);
    }

    /// Check the stall deadline
    ///
    /// A stopped machine only refreshes the baseline. The count saturates
    /// at [`HARD_STOP_TIER`].
    pub fn check_stall(&mut self, now_ms: u32, running: bool) -> StallAction {
        if !running || !self.deadline.is_started() {
            self.deadline.reset(now_ms);
            return StallAction::None;
        }
        if !self.deadline.elapsed_at_least(now_ms, self.stall_timeout_ms) {
            return StallAction::None;
        }

        self.deadline.reset(now_ms);
        self.stall_count = self.stall_count.saturating_add(1).min(HARD_STOP_TIER);
        if self.stall_count >= HARD_STOP_TIER {
            StallAction::HardStop
        } else {
            StallAction::SoftRecovery {
                attempt: self.stall_count,
            }
        }
    }

    /// Clear the stall escalation
    pub fn clear_escalation(&mut self) {
        self.stall_count = 0;
    }

    pub fn stall_count(&self) -> u8 {
        self.stall_count
    }

    pub fn tier(&self) -> StallTier {
        match self.stall_count {
            0 => StallTier::Idle,
            1 => StallTier::Tier1,
            2 => StallTier::Tier2,
            _ => StallTier::HardStop,
        }
    }

    /// Milliseconds until the stall deadline expires
    pub fn deadline_remaining(&self, now_ms: u32) -> u32 {
        self.deadline.remaining(now_ms, self.stall_timeout_ms)
    }
}
