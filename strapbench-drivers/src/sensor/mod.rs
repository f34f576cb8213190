//! Analog sensors

pub mod pressure;

pub use pressure::PressureSensor;
