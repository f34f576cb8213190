//! Controller board pin map
//!
//! | GPIO | Function |
//! |---|---|
//! | 2..=12 | valves, in `Valve::ALL` order |
//! | 13, 14 | strap detectors (upper, lower) |
//! | 15, 16 | spring start / end position switches |
//! | 17..=22 | panel: run, mode, step back, step forward, reset, counter reset |
//! | 26 | pressure transducer (ADC0) |
//!
//! Valve drivers are low-side MOSFETs (active high). Sensors and buttons
//! switch to ground against the internal pull-ups.

use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::gpio::{AnyPin, Pull};
use embassy_rp::{Peri, Peripherals};

use strapbench_core::machine::Machine;
use strapbench_core::rig::Valves;
use strapbench_drivers::actuator::Cylinder;
use strapbench_drivers::input::{debounce::DEFAULT_DEBOUNCE_MS, Debounced, InputSampler};
use strapbench_drivers::sensor::PressureSensor;
use strapbench_drivers::store::CounterBank;
use strapbench_hal_rp2040::adc::Rp2040AnalogInput;
use strapbench_hal_rp2040::flash::Rp2040FlashStorage;
use strapbench_hal_rp2040::gpio::{SensorPin, ValvePin};

use crate::tasks::panel::{PanelButton, PanelInputs};

/// Valve outputs are energised high
const VALVES_ACTIVE_HIGH: bool = true;

/// Sensors and buttons pull the line low when asserted
const INPUTS_ACTIVE_LOW: bool = true;

/// The 12-bit converter is read on the 10-bit calibration scale
const PRESSURE_SHIFT: u8 = 2;

pub type RigValve = Cylinder<ValvePin<'static>>;
pub type RigMachine = Machine<RigValve, CounterBank>;
pub type RigSampler = InputSampler<PressureSensor<Rp2040AnalogInput<'static>>, SensorPin<'static>>;

/// Everything the tasks need, built from the raw peripherals
pub struct Board {
    pub valves: Valves<RigValve>,
    pub sampler: RigSampler,
    pub panel: PanelInputs,
    pub flash: Rp2040FlashStorage<'static>,
}

fn valve(pin: Peri<'static, AnyPin>) -> RigValve {
    Cylinder::new(ValvePin::new(pin, VALVES_ACTIVE_HIGH))
}

fn input(pin: Peri<'static, AnyPin>) -> Debounced<SensorPin<'static>> {
    Debounced::new(SensorPin::new(pin, INPUTS_ACTIVE_LOW), DEFAULT_DEBOUNCE_MS)
}

impl Board {
    pub fn new(p: Peripherals) -> Self {
        let bank = [
            valve(p.PIN_2.into()),
            valve(p.PIN_3.into()),
            valve(p.PIN_4.into()),
            valve(p.PIN_5.into()),
            valve(p.PIN_6.into()),
            valve(p.PIN_7.into()),
            valve(p.PIN_8.into()),
            valve(p.PIN_9.into()),
            valve(p.PIN_10.into()),
            valve(p.PIN_11.into()),
            valve(p.PIN_12.into()),
        ];

        let adc = Adc::new_blocking(p.ADC, adc::Config::default());
        let channel = Channel::new_pin(p.PIN_26, Pull::None);
        let pressure = PressureSensor::with_shift(Rp2040AnalogInput::new(adc, channel), PRESSURE_SHIFT);

        let sampler = InputSampler::new(
            pressure,
            input(p.PIN_13.into()),
            input(p.PIN_14.into()),
            input(p.PIN_15.into()),
            input(p.PIN_16.into()),
        );

        let panel = [
            (PanelButton::RunPause, input(p.PIN_17.into())),
            (PanelButton::Mode, input(p.PIN_18.into())),
            (PanelButton::StepBack, input(p.PIN_19.into())),
            (PanelButton::StepForward, input(p.PIN_20.into())),
            (PanelButton::Reset, input(p.PIN_21.into())),
            (PanelButton::CounterReset, input(p.PIN_22.into())),
        ];

        Self {
            valves: Valves::new(bank),
            sampler,
            panel,
            flash: Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0),
        }
    }
}
