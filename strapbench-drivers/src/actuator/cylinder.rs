//! Solenoid valve driving a pneumatic cylinder
//!
//! The valve is either held or released. A timed double stroke extends
//! the cylinder for a while, then retracts it and waits again before
//! reporting completion, so the next step starts from a settled cylinder.

use strapbench_core::timer::elapsed;
use strapbench_core::traits::Actuator;
use strapbench_hal::ValveOutput;

/// Double stroke progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StrokePhase {
    /// No stroke running
    Idle,
    /// Valve held since the given time
    Extending { since_ms: u32 },
    /// Valve released since the given time
    Retracting { since_ms: u32 },
    /// Stroke finished, waiting to be collected
    Done,
}

/// One valve output with stroke sequencing
pub struct Cylinder<P> {
    pin: P,
    phase: StrokePhase,
}

impl<P: ValveOutput> Cylinder<P> {
    /// Create a cylinder, initially released
    pub fn new(mut pin: P) -> Self {
        pin.deenergize();
        Self {
            pin,
            phase: StrokePhase::Idle,
        }
    }

    pub fn phase(&self) -> StrokePhase {
        self.phase
    }

    /// Give back the output pin
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: ValveOutput> Actuator for Cylinder<P> {
    fn set(&mut self, on: bool) {
        self.phase = StrokePhase::Idle;
        self.pin.set_energized(on);
    }

    fn get_state(&self) -> bool {
        self.pin.is_energized()
    }

    fn stroke(&mut self, now_ms: u32, extend_ms: u32, retract_ms: u32) {
        match self.phase {
            StrokePhase::Idle => {
                self.pin.energize();
                self.phase = StrokePhase::Extending { since_ms: now_ms };
            }
            StrokePhase::Extending { since_ms } if elapsed(now_ms, since_ms, extend_ms) => {
                self.pin.deenergize();
                self.phase = StrokePhase::Retracting { since_ms: now_ms };
            }
            StrokePhase::Retracting { since_ms } if elapsed(now_ms, since_ms, retract_ms) => {
                self.phase = StrokePhase::Done;
            }
            _ => {}
        }
    }

    fn stroke_completed(&mut self) -> bool {
        if self.phase == StrokePhase::Done {
            self.phase = StrokePhase::Idle;
            true
        } else {
            false
        }
    }
}
