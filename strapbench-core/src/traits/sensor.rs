//! Sensor traits

/// Errors that can occur while reading a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// ADC conversion failed
    ConversionError,
}

/// Debounced digital input (strap detector, limit switch, push button)
pub trait DigitalInput {
    /// Current debounced state, true when asserted
    fn raw_state(&self) -> bool;
}

/// Analog sensor returning raw converter counts
///
/// Takes `&mut self` because ADC reads typically require mutable access.
pub trait AnalogSensor {
    fn read(&mut self) -> Result<u16, SensorError>;
}

/// One tick's reading of every rig sensor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorInputs {
    /// Pressure transducer, raw converter counts
    pub pressure_raw: u16,
    /// Strap detector above the tool
    pub strap_upper: bool,
    /// Strap detector below the tool
    pub strap_lower: bool,
    /// Spring cylinder at its start position
    pub start_position: bool,
    /// Spring cylinder at its end position (strap tensioned)
    pub end_position: bool,
}

impl SensorInputs {
    /// Both strap detectors see strap
    pub fn material_present(&self) -> bool {
        self.strap_upper && self.strap_lower
    }
}
