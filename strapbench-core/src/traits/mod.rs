//! Collaborator traits
//!
//! These traits define the interface between the sequencing engine
//! and the drivers that move air and read switches.

pub mod actuator;
pub mod sensor;

pub use actuator::Actuator;
pub use sensor::{AnalogSensor, DigitalInput, SensorError, SensorInputs};
