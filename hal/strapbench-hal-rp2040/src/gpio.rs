//! GPIO wrappers implementing the `strapbench-hal` valve and sensor traits

use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull};
use embassy_rp::Peri;

/// Valve output driven by one GPIO
///
/// `active_high = false` inverts the line for low-side relay boards.
pub struct ValvePin<'d> {
    pin: Output<'d>,
    active_high: bool,
}

impl<'d> ValvePin<'d> {
    /// Create a valve output, initially de-energised
    pub fn new(pin: Peri<'d, AnyPin>, active_high: bool) -> Self {
        let idle = if active_high { Level::Low } else { Level::High };
        Self {
            pin: Output::new(pin, idle),
            active_high,
        }
    }
}

impl strapbench_hal::ValveOutput for ValvePin<'_> {
    fn energize(&mut self) {
        if self.active_high {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
    }

    fn deenergize(&mut self) {
        if self.active_high {
            self.pin.set_low();
        } else {
            self.pin.set_high();
        }
    }

    fn is_energized(&self) -> bool {
        self.pin.is_set_high() == self.active_high
    }
}

/// Sensor or button input on one GPIO
///
/// Inputs use the internal pull-up; `active_low` reports a grounded line as
/// asserted.
pub struct SensorPin<'d> {
    pin: Input<'d>,
    active_low: bool,
}

impl<'d> SensorPin<'d> {
    /// Create a sensor input with the internal pull-up enabled
    pub fn new(pin: Peri<'d, AnyPin>, active_low: bool) -> Self {
        Self {
            pin: Input::new(pin, Pull::Up),
            active_low,
        }
    }
}

impl strapbench_hal::SensorInput for SensorPin<'_> {
    fn is_asserted(&self) -> bool {
        self.pin.is_high() != self.active_low
    }
}
