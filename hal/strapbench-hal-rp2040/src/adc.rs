//! ADC channel for the pressure transducer
//!
//! The RP2040 ADC is 12-bit; readings are returned as raw counts and the
//! engine converts them to bar.

use embassy_rp::adc::{Adc, Blocking, Channel};
use strapbench_hal::analog::{AnalogError, AnalogInput};

/// One ADC channel bound to the shared converter
pub struct Rp2040AnalogInput<'d> {
    adc: Adc<'d, Blocking>,
    channel: Channel<'d>,
}

impl<'d> Rp2040AnalogInput<'d> {
    /// Bind a channel to the converter
    pub fn new(adc: Adc<'d, Blocking>, channel: Channel<'d>) -> Self {
        Self { adc, channel }
    }
}

impl AnalogInput for Rp2040AnalogInput<'_> {
    fn read_counts(&mut self) -> Result<u16, AnalogError> {
        self.adc
            .blocking_read(&mut self.channel)
            .map_err(|_| AnalogError::Conversion)
    }
}
