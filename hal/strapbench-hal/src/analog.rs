//! Analog input abstraction

/// Errors from an analog conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnalogError {
    /// Conversion failed or timed out
    Conversion,
}

/// Single analog input channel returning raw converter counts
pub trait AnalogInput {
    /// Perform one conversion and return the raw counts
    fn read_counts(&mut self) -> Result<u16, AnalogError>;
}
