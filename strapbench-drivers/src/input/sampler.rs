//! One tick's sensor reading
//!
//! Samples the pressure channel and the four debounced rig inputs into a
//! [`SensorInputs`]. A failed conversion repeats the last good pressure
//! reading so a single glitch never looks like a vented spring.

use strapbench_core::traits::{AnalogSensor, DigitalInput, SensorInputs};
use strapbench_hal::SensorInput;

use super::debounce::Debounced;

/// Rig inputs in one place
pub struct InputSampler<S, P> {
    pressure: S,
    strap_upper: Debounced<P>,
    strap_lower: Debounced<P>,
    start_position: Debounced<P>,
    end_position: Debounced<P>,
    last_pressure: u16,
    failures: u32,
}

impl<S: AnalogSensor, P: SensorInput> InputSampler<S, P> {
    pub fn new(
        pressure: S,
        strap_upper: Debounced<P>,
        strap_lower: Debounced<P>,
        start_position: Debounced<P>,
        end_position: Debounced<P>,
    ) -> Self {
        Self {
            pressure,
            strap_upper,
            strap_lower,
            start_position,
            end_position,
            last_pressure: 0,
            failures: 0,
        }
    }

    /// Read every input
    pub fn sample(&mut self, now_ms: u32) -> SensorInputs {
        match self.pressure.read() {
            Ok(counts) => self.last_pressure = counts,
            Err(_) => self.failures = self.failures.saturating_add(1),
        }

        self.strap_upper.update(now_ms);
        self.strap_lower.update(now_ms);
        self.start_position.update(now_ms);
        self.end_position.update(now_ms);

        SensorInputs {
            pressure_raw: self.last_pressure,
            strap_upper: self.strap_upper.raw_state(),
            strap_lower: self.strap_lower.raw_state(),
            start_position: self.start_position.raw_state(),
            end_position: self.end_position.raw_state(),
        }
    }

    /// Conversions that failed since startup
    pub fn pressure_failures(&self) -> u32 {
        self.failures
    }
}
