//! Pressure transducer on an analog channel
//!
//! Returns raw converter counts; scaling to bar belongs to the pressure
//! conditioner. Converters wider than the calibrated scale are shifted
//! down so one configuration works across chips.

use strapbench_core::traits::{AnalogSensor, SensorError};
use strapbench_hal::AnalogInput;

/// Pressure transducer
pub struct PressureSensor<A> {
    adc: A,
    /// Bits dropped from each conversion
    shift: u8,
}

impl<A: AnalogInput> PressureSensor<A> {
    /// Create a sensor reporting counts unchanged
    pub fn new(adc: A) -> Self {
        Self::with_shift(adc, 0)
    }

    /// Create a sensor that drops `shift` low bits from every conversion
    ///
    /// A 12-bit converter on a 10-bit calibration uses a shift of 2.
    pub fn with_shift(adc: A, shift: u8) -> Self {
        Self {
            adc,
            shift: shift.min(15),
        }
    }
}

impl<A: AnalogInput> AnalogSensor for PressureSensor<A> {
    fn read(&mut self) -> Result<u16, SensorError> {
        let counts = self
            .adc
            .read_counts()
            .map_err(|_| SensorError::ConversionError)?;
        Ok(counts >> self.shift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strapbench_hal::analog::AnalogError;

    struct MockAdc {
        value: Result<u16, AnalogError>,
    }

    impl AnalogInput for MockAdc {
        fn read_counts(&mut self) -> Result<u16, AnalogError> {
            self.value
        }
    }

    #[test]
    fn test_counts_pass_through() {
        let mut sensor = PressureSensor::new(MockAdc { value: Ok(512) });
        assert_eq!(sensor.read(), Ok(512));
    }

    #[test]
    fn test_shift_to_ten_bits() {
        let mut sensor = PressureSensor::with_shift(MockAdc { value: Ok(4095) }, 2);
        assert_eq!(sensor.read(), Ok(1023));
    }

    #[test]
    fn test_conversion_error() {
        let mut sensor = PressureSensor::new(MockAdc {
            value: Err(AnalogError::Conversion),
        });
        assert_eq!(sensor.read(), Err(SensorError::ConversionError));
    }
}
