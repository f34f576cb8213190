//! Valve outputs and sensor inputs
//!
//! Pins are described in rig terms rather than line levels: a valve coil is
//! energised or not, a sensor is asserted or not. Chip HALs fold the board's
//! polarity into their implementations, so an active-low relay board and an
//! active-high MOSFET board look the same from here.

/// Solenoid valve coil
pub trait ValveOutput {
    /// Energise the coil
    fn energize(&mut self);

    /// Drop the coil
    fn deenergize(&mut self);

    fn set_energized(&mut self, on: bool) {
        if on {
            self.energize();
        } else {
            self.deenergize();
        }
    }

    /// Last commanded coil state
    fn is_energized(&self) -> bool;
}

/// Strap detector, position switch or panel button
///
/// Undebounced; callers filter bounce themselves.
pub trait SensorInput {
    /// Whether the sensor currently reports its active condition
    fn is_asserted(&self) -> bool;
}
